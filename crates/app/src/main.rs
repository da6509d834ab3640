use std::fmt;

use serde::Serialize;
use services::{
    AdminOverview, AppServices, Clock, Dashboard, ProgressServiceError, SessionHolder,
};
use tracing_subscriber::EnvFilter;
use training_core::model::{BadgeId, Catalog, ModuleId};
use training_core::progression::{CompletionPolicy, ModuleStatus};

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingEmail,
    InvalidCompletion { raw: String },
    InvalidPolicy { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingEmail => write!(f, "--email (or TRAINING_EMAIL) is required"),
            ArgsError::InvalidCompletion { raw } => {
                write!(f, "invalid --complete value (expected <module>:<points>): {raw}")
            }
            ArgsError::InvalidPolicy { raw } => {
                write!(f, "invalid --policy value (expected strict or lenient): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- catalog   [--json]");
    eprintln!("  cargo run -p app -- dashboard --email <email> [--json]");
    eprintln!("  cargo run -p app -- complete  --email <email> --complete <module>:<points>...");
    eprintln!("                                [--policy strict|lenient] [--json]");
    eprintln!("  cargo run -p app -- admin     --email <email> [--json]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --policy strict");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRAINING_EMAIL, TRAINING_POLICY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Catalog,
    Dashboard,
    Complete,
    Admin,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "catalog" => Some(Self::Catalog),
            "dashboard" => Some(Self::Dashboard),
            "complete" => Some(Self::Complete),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    fn needs_email(self) -> bool {
        !matches!(self, Self::Catalog)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    email: Option<String>,
    completions: Vec<(ModuleId, u32)>,
    policy: CompletionPolicy,
    json: bool,
}

fn parse_policy(raw: &str) -> Result<CompletionPolicy, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "strict" => Ok(CompletionPolicy::Strict),
        "lenient" => Ok(CompletionPolicy::Lenient),
        _ => Err(ArgsError::InvalidPolicy {
            raw: raw.to_string(),
        }),
    }
}

fn parse_completion(raw: &str) -> Result<(ModuleId, u32), ArgsError> {
    let invalid = || ArgsError::InvalidCompletion {
        raw: raw.to_string(),
    };
    let (module, points) = raw.split_once(':').ok_or_else(invalid)?;
    let module: ModuleId = module.parse().map_err(|_| invalid())?;
    let points: u32 = points.trim().parse().map_err(|_| invalid())?;
    Ok((module, points))
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        env_email: Option<String>,
        env_policy: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut email = env_email.filter(|value| !value.trim().is_empty());
        let mut policy = match env_policy {
            Some(raw) => parse_policy(&raw)?,
            None => CompletionPolicy::Strict,
        };
        let mut completions = Vec::new();
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--email" => email = Some(require_value(args, "--email")?),
                "--complete" => {
                    let value = require_value(args, "--complete")?;
                    completions.push(parse_completion(&value)?);
                }
                "--policy" => {
                    let value = require_value(args, "--policy")?;
                    policy = parse_policy(&value)?;
                }
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if cmd.needs_email() && email.is_none() {
            return Err(ArgsError::MissingEmail);
        }

        Ok(Self {
            email,
            completions,
            policy,
            json,
        })
    }
}

#[derive(Debug, Serialize)]
struct CompletionReport {
    module_id: ModuleId,
    newly_completed: bool,
    points_delta: i64,
    badges_awarded: Vec<BadgeId>,
}

#[derive(Debug, Serialize)]
struct CompleteOutput {
    completions: Vec<CompletionReport>,
    dashboard: Dashboard,
}

fn status_label(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::Locked => "locked",
        ModuleStatus::Available => "available",
        ModuleStatus::Completed => "completed",
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("Modules:");
    for module in catalog.modules() {
        let prereqs: Vec<&str> = module.prerequisites().iter().map(ModuleId::as_str).collect();
        println!(
            "  {:<8} {:<50} {:>3} pts  {:>2} min  requires [{}]",
            module.id(),
            module.title(),
            module.points(),
            module.required_minutes(),
            prereqs.join(", ")
        );
    }
    println!("Badges:");
    for badge in catalog.badges() {
        println!("  {:<26} {:?}  {}", badge.id(), badge.kind(), badge.title());
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    println!(
        "{} ({}) - {}% complete, {:?}",
        dashboard.learner_name,
        dashboard.department,
        dashboard.progress_percentage,
        dashboard.state
    );
    println!(
        "Points: {}/{} ({}%)  Badges: {}/{} ({}%)",
        dashboard.summary.points,
        dashboard.summary.possible_points,
        dashboard.summary.points_percentage,
        dashboard.summary.badges_earned,
        dashboard.summary.badge_count,
        dashboard.summary.badge_percentage
    );
    for card in &dashboard.modules {
        println!(
            "  [{:<9}] {:<8} {} ({} pts)",
            status_label(card.status),
            card.module_id,
            card.title,
            card.points
        );
    }
    let earned: Vec<&str> = dashboard
        .badges
        .iter()
        .filter(|b| b.earned)
        .map(|b| b.title.as_str())
        .collect();
    println!("Earned badges: {}", earned.join(", "));
}

fn print_admin(overview: &AdminOverview) {
    let totals = &overview.totals;
    println!(
        "Organisation: {} staff, {}% complete ({} completed, {} in progress, {} not started)",
        totals.total_employees,
        totals.completion_rate,
        totals.completed,
        totals.in_progress,
        totals.not_started
    );
    println!("Departments:");
    for row in &overview.departments {
        println!(
            "  {:<24} {:>3} staff  {:>3}% complete ({} in progress, {} not started)",
            row.department,
            row.total_employees,
            row.completion_rate,
            row.in_progress,
            row.not_started
        );
    }
    println!("Learners:");
    for row in &overview.learners {
        println!(
            "  {:<14} {:<14} {:>3}%  {:>4} pts  {:?}",
            row.name, row.department, row.progress_percentage, row.points, row.state
        );
    }
}

fn emit_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(
        cmd,
        &mut argv,
        std::env::var("TRAINING_EMAIL").ok(),
        std::env::var("TRAINING_POLICY").ok(),
    )
    .map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let app = AppServices::seeded(Clock::system(), parsed.policy)?;
    tracing::debug!(policy = ?parsed.policy, "services ready");

    let mut session = SessionHolder::new();
    match cmd {
        Command::Catalog => {
            let catalog = app.catalog();
            if parsed.json {
                emit_json(catalog.as_ref())?;
            } else {
                print_catalog(&catalog);
            }
        }
        Command::Dashboard => {
            let email = parsed.email.as_deref().ok_or(ArgsError::MissingEmail)?;
            let learner = app.sign_in().sign_in(&mut session, email).await?;
            let dashboard = app.dashboard().dashboard(learner);
            if parsed.json {
                emit_json(&dashboard)?;
            } else {
                print_dashboard(&dashboard);
            }
        }
        Command::Complete => {
            let email = parsed.email.as_deref().ok_or(ArgsError::MissingEmail)?;
            app.sign_in().sign_in(&mut session, email).await?;

            let progress = app.progress();
            let mut completions = Vec::with_capacity(parsed.completions.len());
            for (module_id, points) in &parsed.completions {
                let completion = progress.finish_module(&mut session, module_id, *points)?;
                completions.push(CompletionReport {
                    module_id: module_id.clone(),
                    newly_completed: completion.newly_completed,
                    points_delta: completion.points_delta,
                    badges_awarded: completion.badges_awarded,
                });
            }

            let learner = session
                .current_learner()
                .ok_or(ProgressServiceError::NotSignedIn)?;
            let dashboard = app.dashboard().dashboard(learner);
            if parsed.json {
                emit_json(&CompleteOutput {
                    completions,
                    dashboard,
                })?;
            } else {
                for report in &completions {
                    println!(
                        "{}: {:+} pts{}",
                        report.module_id,
                        report.points_delta,
                        if report.newly_completed { ", completed" } else { "" }
                    );
                    for badge in &report.badges_awarded {
                        println!("  badge awarded: {badge}");
                    }
                }
                print_dashboard(&dashboard);
            }
        }
        Command::Admin => {
            let email = parsed.email.as_deref().ok_or(ArgsError::MissingEmail)?;
            let learner = app.sign_in().sign_in(&mut session, email).await?;
            let overview = app.dashboard().admin_overview(learner).await?;
            if parsed.json {
                emit_json(&overview)?;
            } else {
                print_admin(&overview);
            }
        }
    }

    session.sign_out();
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(cmd: Command, args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_string());
        Args::parse(cmd, &mut iter, None, None)
    }

    #[test]
    fn parses_repeated_completions_in_order() {
        let args = parse(
            Command::Complete,
            &[
                "--email",
                "user@gennova.com",
                "--complete",
                "module2:150",
                "--complete",
                "module3:120",
            ],
        )
        .unwrap();
        assert_eq!(
            args.completions,
            vec![(ModuleId::new("module2"), 150), (ModuleId::new("module3"), 120)]
        );
        assert_eq!(args.policy, CompletionPolicy::Strict);
    }

    #[test]
    fn rejects_malformed_completion() {
        let err = parse(
            Command::Complete,
            &["--email", "a@b.c", "--complete", "module2"],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ArgsError::InvalidCompletion {
                raw: "module2".into()
            }
        );
        assert!(parse(Command::Complete, &["--email", "a@b.c", "--complete", "m:-4"]).is_err());
    }

    #[test]
    fn email_is_required_except_for_catalog() {
        assert_eq!(
            parse(Command::Dashboard, &[]).unwrap_err(),
            ArgsError::MissingEmail
        );
        assert!(parse(Command::Catalog, &["--json"]).unwrap().json);
    }

    #[test]
    fn env_supplies_defaults_and_flags_override() {
        let mut iter = ["--policy", "lenient"].iter().map(|s| (*s).to_string());
        let args = Args::parse(
            Command::Dashboard,
            &mut iter,
            Some("admin@gennova.com".into()),
            Some("STRICT".into()),
        )
        .unwrap();
        assert_eq!(args.email.as_deref(), Some("admin@gennova.com"));
        assert_eq!(args.policy, CompletionPolicy::Lenient);

        let mut none = std::iter::empty::<String>();
        let err = Args::parse(Command::Catalog, &mut none, None, Some("loose".into())).unwrap_err();
        assert_eq!(err, ArgsError::InvalidPolicy { raw: "loose".into() });
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert_eq!(
            parse(Command::Catalog, &["--db"]).unwrap_err(),
            ArgsError::UnknownArg("--db".into())
        );
    }
}
