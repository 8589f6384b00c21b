pub mod github;

pub use github::GitHubRemote;

use crate::error::RemoteError;
use crate::model::NotificationItem;

/// The remote notification service, as the engine sees it.
///
/// `fetch` pulls the current inbox; the mutating calls push local
/// decisions upstream. Pushes are fire-and-forget relative to local
/// state: a failure is reported as a warning and the optimistic local
/// mutation is never rolled back.
pub trait RemoteInbox {
    /// Fetch the remote inbox snapshot.
    fn fetch(&self) -> Result<Vec<NotificationItem>, RemoteError>;

    /// Mark one thread read upstream.
    fn mark_read(&self, id: &str) -> Result<(), RemoteError>;

    /// Mark the whole inbox read upstream.
    fn mark_all_read(&self) -> Result<(), RemoteError>;

    /// Unsubscribe from a thread upstream.
    fn unsubscribe(&self, id: &str) -> Result<(), RemoteError>;
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "notibox";

    pub fn get(key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<(), Box<dyn std::error::Error>> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
