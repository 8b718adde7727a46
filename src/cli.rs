use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::blockers::Blockers;
use crate::config::Config;
use crate::mail::SmtpMailer;
use crate::output::{print_dry_run, print_run_summary, PhaseProgress};
use crate::providers::{BugzillaClient, JenkinsClient, JiraClient};
use crate::reminder::{Dispatcher, HandlebarsRenderer, Reminder};
use crate::report::{OwnerReport, ReportHeader};

#[derive(Parser)]
#[command(name = "jeeves")]
#[command(author, version, about = "CI Failure Reminders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file; defaults to ./jeeves.toml or the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write dry-run JSON to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Email every job owner a digest of their failing Jenkins jobs
    Remind(RemindArgs),
}

#[derive(Args)]
struct RemindArgs {
    /// YAML blocker file mapping job names to owners and known blockers
    #[arg(short, long)]
    blockers: Option<PathBuf>,

    /// Build the reports and print them as JSON without sending mail
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[arg(long, env = "JENKINS_URL")]
    jenkins_url: Option<String>,

    #[arg(long, env = "JENKINS_USER")]
    jenkins_user: Option<String>,

    #[arg(long, env = "JENKINS_TOKEN", hide_env_values = true)]
    jenkins_token: Option<String>,

    #[arg(long, env = "BUGZILLA_URL")]
    bugzilla_url: Option<String>,

    #[arg(long, env = "BUGZILLA_API_KEY", hide_env_values = true)]
    bugzilla_key: Option<String>,

    #[arg(long, env = "JIRA_URL")]
    jira_url: Option<String>,

    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    jira_token: Option<String>,

    #[arg(long, env = "JEEVES_SMTP_HOST")]
    smtp_host: Option<String>,

    #[arg(long)]
    smtp_port: Option<u16>,

    /// Sender address of the reminders
    #[arg(long)]
    from: Option<String>,
}

impl RemindArgs {
    /// Lays the command-line values over the loaded configuration.
    fn apply(&self, config: &mut Config) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        set(&mut config.blockers, &self.blockers);
        set(&mut config.jenkins.url, &self.jenkins_url);
        set(&mut config.jenkins.user, &self.jenkins_user);
        set(&mut config.jenkins.api_token, &token(&self.jenkins_token));
        set(&mut config.bugzilla.url, &self.bugzilla_url);
        set(&mut config.bugzilla.api_key, &token(&self.bugzilla_key));
        set(&mut config.jira.url, &self.jira_url);
        set(&mut config.jira.token, &token(&self.jira_token));
        set(&mut config.mail.smtp_host, &self.smtp_host);
        set(&mut config.mail.from_address, &self.from);

        if let Some(port) = self.smtp_port {
            config.mail.smtp_port = port;
        }
    }
}

fn token(value: &Option<String>) -> Option<Token> {
    value.as_deref().map(Token::from)
}

impl Cli {
    async fn execute_remind(&self, args: &RemindArgs) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        args.apply(&mut config);

        let blockers_path = config
            .blockers
            .as_deref()
            .ok_or_else(|| anyhow!("No blocker file given; use --blockers or set `blockers` in the config"))?;
        let blockers = Blockers::load(blockers_path)
            .with_context(|| format!("Failed to load blocker file: {}", blockers_path.display()))?;

        if blockers.is_empty() {
            warn!("Blocker file {} lists no jobs", blockers_path.display());
        }

        let owners = blockers.owners();
        if owners.is_empty() {
            info!("No owners found in blocker file, nothing to do");
            return Ok(());
        }

        let reminder = build_reminder(&config)?;

        let progress = PhaseProgress::start_correlation(owners.len(), args.dry_run);
        let reports = reminder.collect_reports(&blockers).await;
        let failing_jobs = reports.iter().map(|r| r.rows.len()).sum();
        let progress = progress.finish_correlation(failing_jobs);

        if args.dry_run {
            return self.write_dry_run(&reports);
        }

        let dispatcher = build_dispatcher(&config)?;
        let pending = reports.iter().filter(|r| !r.is_clear()).count();

        let progress = progress.start_dispatch(pending);
        let summary = dispatcher.dispatch_all(&reports).await;
        progress.finish_dispatch();

        print_run_summary(&summary);
        Ok(())
    }

    fn write_dry_run(&self, reports: &[OwnerReport]) -> Result<()> {
        let pending: Vec<&OwnerReport> = reports.iter().filter(|r| !r.is_clear()).collect();

        let json_output = if self.pretty {
            serde_json::to_string_pretty(&pending)?
        } else {
            serde_json::to_string(&pending)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Reports written to: {}", output_path.display());
            print_dry_run(reports);
        } else {
            println!("{json_output}");
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Remind(args) => self.execute_remind(args).await,
        }
    }
}

fn build_reminder(
    config: &Config,
) -> Result<Reminder<JenkinsClient, Option<BugzillaClient>, Option<JiraClient>>> {
    let jenkins_url = config
        .jenkins
        .url
        .as_deref()
        .ok_or_else(|| anyhow!("Jenkins URL is required; use --jenkins-url or [jenkins] url"))?;
    let jenkins = JenkinsClient::new(
        jenkins_url,
        config.jenkins.user.clone(),
        config.jenkins.api_token.clone(),
    )
    .context("Invalid Jenkins configuration")?;

    let bugzilla = match &config.bugzilla.url {
        Some(url) => Some(
            BugzillaClient::new(url, config.bugzilla.api_key.clone())
                .context("Invalid Bugzilla configuration")?,
        ),
        None => {
            info!("Bugzilla is not configured, bug lookups will show placeholders");
            None
        }
    };

    let jira = match &config.jira.url {
        Some(url) => Some(
            JiraClient::new(url, config.jira.token.clone())
                .context("Invalid Jira configuration")?,
        ),
        None => {
            info!("Jira is not configured, ticket lookups will show placeholders");
            None
        }
    };

    Ok(Reminder::new(jenkins, bugzilla, jira))
}

fn build_dispatcher(
    config: &Config,
) -> Result<Dispatcher<HandlebarsRenderer<'static>, SmtpMailer>> {
    let smtp_host = config
        .mail
        .smtp_host
        .as_deref()
        .ok_or_else(|| anyhow!("SMTP host is required; use --smtp-host or [mail] smtp-host"))?;
    let from_address = config
        .mail
        .from_address
        .clone()
        .ok_or_else(|| anyhow!("Sender address is required; use --from or [mail] from-address"))?;

    let header = ReportHeader {
        from_address,
        from_name: config.mail.from_name.clone(),
        date: chrono::Local::now().date_naive(),
        labels: config.report.labels.clone(),
    };

    Ok(Dispatcher::new(
        HandlebarsRenderer::new()?,
        SmtpMailer::new(smtp_host, config.mail.smtp_port),
        header,
        fallback_dir(&config.mail.fallback_dir),
    ))
}

fn fallback_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.to_path_buf())
    }
}
