use chrono::{DateTime, Local};
use clap::Args;
use placement::allocation::{
    allocate, capacity_before_applicant, Allocation, Assignment, CapacityTable, Preference,
    PlacementSource,
};
use placement::client::{
    ApiClient, ApplicantStatus, Dashboard, LoginError, PreferenceEditor, Resync, RosterSync,
    Session, SyncState,
};
use placement::config::AppConfig;
use placement::error::AppError;
use placement::roster::{CsvWorkbook, RosterServiceError, RosterStore};
use placement::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

#[derive(Args, Debug, Default)]
pub(crate) struct AllocateArgs {
    /// Directory holding config.csv and roster.csv (defaults to APP_WORKBOOK_DIR)
    #[arg(long)]
    pub(crate) workbook: Option<PathBuf>,
    /// Also print the capacity this applicant sees when their turn comes
    #[arg(long)]
    pub(crate) viewer: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct WatchArgs {
    /// Applicant name to log in as
    #[arg(long)]
    pub(crate) name: String,
    /// Passcode shown in the roster; kept for display only
    #[arg(long, default_value = "")]
    pub(crate) passcode: String,
    /// Override the configured API base URL
    #[arg(long)]
    pub(crate) api_url: Option<String>,
    /// Stop after this many dashboards have been printed
    #[arg(long)]
    pub(crate) ticks: Option<usize>,
}

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Applicant name to log in as
    #[arg(long)]
    pub(crate) name: String,
    /// Passcode shown in the roster; kept for display only
    #[arg(long, default_value = "")]
    pub(crate) passcode: String,
    /// Override the configured API base URL
    #[arg(long)]
    pub(crate) api_url: Option<String>,
    /// Department choice in priority order, as LABEL or LABEL:bound. Repeatable.
    #[arg(long = "choice", value_parser = crate::infra::parse_choice)]
    pub(crate) choices: Vec<Preference>,
    /// Confirm that an empty list should clear every stored preference
    #[arg(long)]
    pub(crate) allow_empty: bool,
}

pub(crate) fn run_allocate(args: AllocateArgs) -> Result<(), AppError> {
    let AllocateArgs { workbook, viewer } = args;

    let mut config = command_config()?;
    if let Some(dir) = workbook {
        config.store.workbook_dir = dir;
    }
    let workbook = config.store.workbook_dir;
    let store = CsvWorkbook::open(&workbook);
    let snapshot = store.load()?;
    let allocation = allocate(&snapshot);

    println!(
        "Allocation for {} applicants across {} departments ({})",
        snapshot.applicants.len(),
        snapshot.departments.len(),
        workbook.display()
    );
    render_allocation(&allocation);
    render_capacity("Residual capacity", allocation.residual());

    if let Some(name) = viewer {
        let view = capacity_before_applicant(&snapshot, &allocation, &name)
            .ok_or_else(|| RosterServiceError::UnknownApplicant(name.clone()))?;
        render_capacity(&format!("Capacity left when {name} chooses"), &view);
    }

    Ok(())
}

pub(crate) async fn run_watch(args: WatchArgs) -> Result<(), AppError> {
    let sync = Arc::new(connect(args.api_url.clone())?);
    let updates = sync.subscribe();
    let (stop, stopped) = oneshot::channel::<()>();

    let poller = {
        let sync = sync.clone();
        tokio::spawn(async move {
            sync.run_until(async {
                let _ = stopped.await;
            })
            .await;
        })
    };

    let outcome = follow(updates, &args).await;

    let _ = stop.send(());
    let _ = poller.await;
    outcome
}

async fn follow(mut updates: watch::Receiver<SyncState>, args: &WatchArgs) -> Result<(), AppError> {
    let editor = PreferenceEditor::new();
    let mut session: Option<Session> = None;
    let mut printed = 0usize;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }

        let state = updates.borrow_and_update().clone();
        if state.syncing {
            continue;
        }
        if let Some(err) = &state.last_error {
            println!("! sync failed, retrying: {err}");
            continue;
        }
        let Some(snapshot) = state.snapshot else {
            continue;
        };

        let current = match &session {
            Some(current) => current.clone(),
            None => {
                let login = Session::login(&snapshot, &args.name, &args.passcode)?;
                println!("Logged in as {} (rank {})", login.name, login.rank);
                session.insert(login).clone()
            }
        };

        let dashboard = Dashboard::build(&snapshot, &current, &editor);
        render_dashboard(&current, &dashboard, state.last_updated);

        printed += 1;
        if args.ticks.is_some_and(|ticks| printed >= ticks) {
            return Ok(());
        }
    }
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let SubmitArgs {
        name,
        passcode,
        api_url,
        choices,
        allow_empty,
    } = args;

    let sync = connect(api_url)?;
    let snapshot = sync.refresh().await?;
    let session = Session::login(&snapshot, &name, &passcode)?;
    let applicant = session
        .applicant(&snapshot)
        .ok_or_else(|| LoginError::UnknownApplicant(name.clone()))?;

    let mut editor = PreferenceEditor::new();
    editor.begin(applicant)?;
    for entry in editor.draft().to_vec() {
        editor.remove(&entry.id)?;
    }
    for choice in &choices {
        if !editor.add(&choice.label, choice.is_bound)? {
            println!("Skipping repeated choice {}", choice.slot_key());
        }
    }

    if editor.needs_confirmation() && !allow_empty {
        editor.cancel()?;
        println!("Refusing to clear every preference for {name}; pass --allow-empty to confirm");
        return Ok(());
    }

    let request = editor.submit(&session.name)?;
    let outcome = sync.save(&request).await;
    // RosterSync::save has already re-fetched.
    let Resync::Required = editor.finish()?;
    outcome?;

    println!(
        "Saved {} choice(s) for {}",
        request.preferences.len(),
        session.name
    );
    if let Some(snapshot) = sync.current().snapshot {
        let dashboard = Dashboard::build(&snapshot, &session, &editor);
        render_dashboard(&session, &dashboard, sync.current().last_updated);
    }

    Ok(())
}

/// Loads configuration and installs the log subscriber for a one-shot command.
fn command_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

fn connect(api_url: Option<String>) -> Result<RosterSync, AppError> {
    let config = command_config()?;

    let base_url = api_url.unwrap_or(config.client.api_url);
    let api = ApiClient::new(base_url, config.client.request_timeout)?;
    Ok(RosterSync::new(api, config.client.poll_interval))
}

fn render_allocation(allocation: &Allocation) {
    println!("{:>6}  {:<20} {:<16} source", "rank", "name", "slot");
    for placement in allocation.placements() {
        let source = match placement.source {
            PlacementSource::PreAssigned => "pre-assigned".to_string(),
            PlacementSource::Preference { choice } => format!("choice #{}", choice + 1),
            PlacementSource::Unassigned => "unassigned".to_string(),
        };
        println!(
            "{:>6}  {:<20} {:<16} {}",
            placement.rank.to_string(),
            placement.name,
            slot_label(placement.assignment.as_ref()),
            source
        );
    }
    println!(
        "{} of {} applicants placed",
        allocation.assigned_count(),
        allocation.placements().len()
    );
}

fn render_capacity(title: &str, capacity: &CapacityTable) {
    println!("\n{title}");
    if capacity.is_empty() {
        println!("  (no departments configured)");
        return;
    }
    for (key, remaining) in capacity.iter() {
        println!("  - {key}: {remaining}");
    }
}

fn render_dashboard(session: &Session, dashboard: &Dashboard, updated: Option<DateTime<Local>>) {
    let stamp = updated
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    println!("\n[{stamp}] {} ({})", session.name, describe_status(&dashboard.status));

    println!("Roster:");
    for row in &dashboard.roster {
        let marker = if row.is_viewer { ">" } else { " " };
        let fixed = if row.pre_assigned { " (fixed)" } else { "" };
        println!(
            " {marker}{:>5}  {:<20} {}{fixed}",
            row.rank.to_string(),
            row.name,
            slot_label(row.assignment.as_ref())
        );
    }

    println!("Open regular slots at your turn:");
    for tile in &dashboard.options {
        let state = if tile.is_full { "full" } else { "open" };
        println!("  - {:<16} {:>3} left ({state})", tile.label, tile.remaining);
    }
}

fn describe_status(status: &ApplicantStatus) -> String {
    match status {
        ApplicantStatus::Assigned {
            label,
            is_bound,
            locked: true,
            ..
        } => format!("pre-assigned to {}", slot_text(label, *is_bound)),
        ApplicantStatus::Assigned {
            label,
            is_bound,
            choices_submitted,
            ..
        } => format!(
            "placed in {} from {choices_submitted} choice(s)",
            slot_text(label, *is_bound)
        ),
        ApplicantStatus::AwaitingPreferences => "no preferences submitted".to_string(),
        ApplicantStatus::AllChoicesFull { choices_submitted } => {
            format!("all {choices_submitted} choice(s) are full")
        }
    }
}

fn slot_label(assignment: Option<&Assignment>) -> String {
    assignment
        .map(|assignment| slot_text(&assignment.label, assignment.is_bound))
        .unwrap_or_else(|| "-".to_string())
}

fn slot_text(label: &str, is_bound: bool) -> String {
    if is_bound {
        format!("{label} [bound]")
    } else {
        label.to_string()
    }
}
