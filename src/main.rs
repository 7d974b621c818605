use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Result, eyre};
use lolipop::config::{self, DESCRIPTOR_FILES};
use lolipop::identity::normalize_path;
use lolipop::init::init_project;
use lolipop::paths::AppDirs;
use lolipop::tracker::Tracker;
use lolipop::{envs, git, scripts};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as Process;
use tracing::info;

#[derive(Parser)]
#[command(name = "lolipop")]
#[command(about = "Lolipop: install, set up, and manage projects and environments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a project from lolipop.yaml / loli.yaml
    Init {
        /// Path to lolipop.yaml / loli.yaml (.yaml or .yml)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Directory to create the project in
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },

    /// Run a project's scripts or a single file
    Run {
        /// Project directory or file to run
        #[arg(default_value = ".")]
        target: PathBuf,
    },

    /// Manage tracked projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List all tracked projects
    List,
    /// Show the active project
    Current,
    /// Show detailed project info
    Info { name: String },
    /// Switch active project
    Switch { name: String },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dirs = AppDirs::resolve()?;
    let tracker = Tracker::open(&dirs)?;

    match cli.command {
        Commands::Init { file, directory } => cmd_init(&dirs, &tracker, file, directory),
        Commands::Run { target } => cmd_run(&dirs, &tracker, &target),
        Commands::Project { command } => match command {
            ProjectCommands::List => cmd_list(&tracker),
            ProjectCommands::Current => cmd_current(&tracker),
            ProjectCommands::Info { name } => cmd_info(&tracker, &name),
            ProjectCommands::Switch { name } => cmd_switch(&tracker, &name),
        },
    }
}

fn cmd_init(
    dirs: &AppDirs,
    tracker: &Tracker,
    file: Option<PathBuf>,
    directory: Option<PathBuf>,
) -> Result<()> {
    let cfg_path = match file {
        Some(path) => path,
        None => DESCRIPTOR_FILES
            .into_iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
            .ok_or_else(|| eyre!("No lolipop.yaml / loli.yaml found in current directory"))?,
    };
    let cfg_path = normalize_path(&cfg_path);

    let cfg = config::load_yaml(&cfg_path)?;
    let name = cfg
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| eyre!("Project name is required"))?;

    let target_dir = match directory {
        Some(dir) => {
            fs::create_dir_all(&dir)?;
            normalize_path(&dir)
        }
        None => std::env::current_dir()?,
    };

    // Place the config inside the project when initialized from elsewhere.
    if let Some(file_name) = cfg_path.file_name() {
        let target_cfg = target_dir.join(file_name);
        if normalize_path(&target_cfg) != cfg_path {
            fs::copy(&cfg_path, &target_cfg)?;
            success(&format!("Config placed at {}", target_cfg.display()));
        }
    }

    // Scan, don't force: only a brand-new project gets a repository.
    if !target_dir.join(".git").exists() {
        info!("Initializing Git repository");
        git::init_repo(&target_dir)?;
    }

    init_project(&cfg, &target_dir, dirs, tracker)?;

    success(&format!("Project '{}' initialized successfully 🍭", name));
    Ok(())
}

fn cmd_run(dirs: &AppDirs, tracker: &Tracker, target: &Path) -> Result<()> {
    let target_path = normalize_path(target);
    let project_dir = if target_path.is_file() {
        target_path
            .parent()
            .ok_or_else(|| eyre!("Cannot determine project directory for {}", target_path.display()))?
            .to_path_buf()
    } else {
        target_path.clone()
    };

    let cfg = config::load_project_config(&project_dir)?;

    let env_spec = cfg.environment.clone().unwrap_or_default();
    let env_root = if env_spec.name.is_some() {
        envs::resolve_environment(dirs, &env_spec)?
    } else {
        envs::create_base_environment(dirs)?
    };

    let lang = env_spec.lang.as_deref().unwrap_or("python");
    if lang != "python" {
        return Err(eyre!("Unsupported language: {}", lang));
    }

    let project_name = cfg.name.clone().unwrap_or_else(|| {
        project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    if target_path.is_file() {
        let python_cmd = match env_spec.version.as_deref() {
            Some(version) => format!("python{}", version),
            None => "python3.11".to_string(),
        };
        let file_name = target_path
            .file_name()
            .ok_or_else(|| eyre!("Invalid file target"))?;

        info!(file = ?file_name, python = %python_cmd, "Running file");
        let path_var = format!(
            "{}:{}",
            env_root.join("bin").display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let status = Process::new(&python_cmd)
            .arg(file_name)
            .current_dir(&project_dir)
            .env("PATH", path_var)
            .status()?;
        if !status.success() {
            return Err(eyre!("Command failed: {} {}", python_cmd, file_name.to_string_lossy()));
        }

        tracker.record_event(
            &project_name,
            "run:file",
            serde_json::json!({ "file": file_name.to_string_lossy() }),
        )?;
        return Ok(());
    }

    let run_scripts = cfg.script("run");
    if run_scripts.is_empty() {
        return Err(eyre!("No 'run' script defined in config"));
    }

    scripts::run_scripts(run_scripts, &project_dir, &env_root)?;
    tracker.record_event(&project_name, "run:project", serde_json::json!({}))?;
    Ok(())
}

fn cmd_list(tracker: &Tracker) -> Result<()> {
    let projects = tracker.list_projects()?;

    if projects.is_empty() {
        println!("No projects tracked yet.");
        return Ok(());
    }

    for p in projects {
        let marker = if p.active { "✔".green().to_string() } else { " ".to_string() };
        println!("[{}] {} → {}", marker, p.name.bold(), p.path);
    }
    Ok(())
}

fn cmd_current(tracker: &Tracker) -> Result<()> {
    match tracker.get_active_project()? {
        Some(p) => {
            success(&format!("Active project: {}", p.name));
            println!("{}", p.path);
        }
        None => eprintln!("{}", "No active project set".red()),
    }
    Ok(())
}

fn cmd_info(tracker: &Tracker, name: &str) -> Result<()> {
    let record = tracker
        .load_project(name)?
        .ok_or_else(|| eyre!("Project '{}' not found", name))?;

    println!("Project: {}", record.name.bold());
    println!("Path: {}", record.path);
    println!(
        "Environment: {}",
        record.environment.name.as_deref().unwrap_or("-")
    );

    if record.git.initialized {
        println!("Git branch: {}", record.git.branch.as_deref().unwrap_or("-"));
        println!("Git commit: {}", record.git.commit.as_deref().unwrap_or("-"));
        println!("Dirty: {}", record.git.dirty);
    } else {
        println!("Git: not initialized");
    }

    if record.opened_in_vscode {
        println!("Opened in VS Code {}", "✔".green());
    }
    Ok(())
}

fn cmd_switch(tracker: &Tracker, name: &str) -> Result<()> {
    if tracker.load_project(name)?.is_none() {
        return Err(eyre!("Project '{}' not found", name));
    }

    tracker.set_active_project(name)?;
    success(&format!("Switched active project to '{}'", name));
    Ok(())
}

fn success(msg: &str) {
    println!("{}", msg.green());
}
