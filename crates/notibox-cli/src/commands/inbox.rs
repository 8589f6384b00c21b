use clap::Subcommand;
use notibox_core::model::InboxFilter;
use notibox_core::remote::{GitHubRemote, RemoteInbox};

#[derive(Subcommand)]
pub enum InboxAction {
    /// List active notifications
    List {
        /// Filter lane (all, mentions, reviews, assigned); persisted
        #[arg(long)]
        filter: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Per-filter counts over the active bucket
    Counts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch the remote inbox and merge it in
    Refresh,
}

pub fn run(action: InboxAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = super::open_store()?;

    match action {
        InboxAction::List { filter, json } => {
            if let Some(name) = filter {
                let parsed = InboxFilter::parse(&name).ok_or_else(|| {
                    format!("unknown filter: {name}. Valid filters: all, mentions, reviews, assigned")
                })?;
                store.set_filter(parsed);
                store.flush()?;
            }
            let items = store.filtered_notifications();
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("Inbox empty ({}).", store.active_filter().as_str());
            } else {
                for item in &items {
                    let marker = if item.unread { "*" } else { " " };
                    println!(
                        "{} {}  [{}] {} - {}",
                        marker,
                        item.id,
                        item.reason.as_str(),
                        item.repository.full_name,
                        item.subject.title,
                    );
                }
            }
        }
        InboxAction::Counts { json } => {
            let counts = store.filter_counts();
            if json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                println!("all:      {}", counts.all);
                println!("mentions: {}", counts.mentions);
                println!("reviews:  {}", counts.reviews);
                println!("assigned: {}", counts.assigned);
            }
        }
        InboxAction::Refresh => {
            let remote = GitHubRemote::new()?;
            if !remote.is_authenticated() {
                return Err(
                    "GitHub is not authenticated. Run 'notibox-cli auth login' first.".into(),
                );
            }
            match remote.fetch() {
                Ok(items) => {
                    let fetched = items.len();
                    store.ingest(items);
                    store.flush()?;
                    println!(
                        "Fetched {} notification(s), {} active.",
                        fetched,
                        store.notifications().len()
                    );
                }
                Err(e) => {
                    store.note_remote_failure("fetch", &e.to_string());
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
