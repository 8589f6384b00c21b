use clap::Subcommand;
use notibox_core::remote::{GitHubRemote, RemoteInbox};
use notibox_core::NotificationStore;

#[derive(Subcommand)]
pub enum ReadAction {
    /// Mark specific notifications read
    Mark {
        /// Notification ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark every active notification read
    All,
    /// Restore the last bulk mark-as-read
    Undo,
}

pub fn run(action: ReadAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = super::open_store()?;

    match action {
        ReadAction::Mark { ids } => {
            let affected = store.bulk_mark_as_read(Some(&ids));
            store.flush()?;
            println!("Marked {} notification(s) read.", affected.len());
            push_reads(&mut store, &affected);
        }
        ReadAction::All => {
            let affected = store.bulk_mark_as_read(None);
            store.flush()?;
            println!("Marked {} notification(s) read.", affected.len());
            if !affected.is_empty() {
                push_read_all(&mut store);
            }
        }
        ReadAction::Undo => {
            if !store.has_undo() {
                println!("Nothing to undo.");
                return Ok(());
            }
            let restored = store.undo_last_mark_as_read();
            store.flush()?;
            println!("Restored {} notification(s).", restored.len());
        }
    }

    Ok(())
}

/// Push per-thread read state upstream. Failures warn and never roll
/// back the local mutation.
fn push_reads(store: &mut NotificationStore, ids: &[String]) {
    let remote = match GitHubRemote::new() {
        Ok(r) if r.is_authenticated() => r,
        _ => return,
    };
    for id in ids {
        if let Err(e) = remote.mark_read(id) {
            eprintln!("warning: remote mark-read failed for {id}: {e}");
            store.note_remote_failure("mark_read", &e.to_string());
        }
    }
}

fn push_read_all(store: &mut NotificationStore) {
    let remote = match GitHubRemote::new() {
        Ok(r) if r.is_authenticated() => r,
        _ => return,
    };
    if let Err(e) = remote.mark_all_read() {
        eprintln!("warning: remote mark-all-read failed: {e}");
        store.note_remote_failure("mark_all_read", &e.to_string());
    }
}
