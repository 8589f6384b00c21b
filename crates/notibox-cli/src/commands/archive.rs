use clap::Subcommand;
use notibox_core::remote::{GitHubRemote, RemoteInbox};
use notibox_core::NotificationStore;

#[derive(Subcommand)]
pub enum ArchiveAction {
    /// Archive notifications by id
    Add {
        /// Notification ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Also unsubscribe from the threads upstream
        #[arg(long)]
        unsubscribe: bool,
    },
    /// List the archived bucket
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ArchiveAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = super::open_store()?;

    match action {
        ArchiveAction::Add { ids, unsubscribe } => {
            let archived = store.bulk_archive(&ids);
            store.flush()?;
            println!("Archived {} notification(s).", archived.len());
            push_archives(&mut store, &archived, unsubscribe);
        }
        ArchiveAction::List { json } => {
            let items = store.archived();
            if json {
                println!("{}", serde_json::to_string_pretty(items)?);
            } else if items.is_empty() {
                println!("Archive empty.");
            } else {
                for item in items {
                    println!(
                        "{}  [{}] {} - {}",
                        item.id,
                        item.reason.as_str(),
                        item.repository.full_name,
                        item.subject.title,
                    );
                }
            }
        }
    }

    Ok(())
}

/// Archived threads are marked read upstream so the remote unread
/// count drops too. Failures warn; the archive itself stands.
fn push_archives(store: &mut NotificationStore, ids: &[String], unsubscribe: bool) {
    let remote = match GitHubRemote::new() {
        Ok(r) if r.is_authenticated() => r,
        _ => return,
    };
    for id in ids {
        if let Err(e) = remote.mark_read(id) {
            eprintln!("warning: remote mark-read failed for {id}: {e}");
            store.note_remote_failure("mark_read", &e.to_string());
        }
        if unsubscribe {
            if let Err(e) = remote.unsubscribe(id) {
                eprintln!("warning: remote unsubscribe failed for {id}: {e}");
                store.note_remote_failure("unsubscribe", &e.to_string());
            }
        }
    }
}
