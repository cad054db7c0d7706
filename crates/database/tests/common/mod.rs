use configuration::DatabaseSettings;
use database::Store;
use tempfile::TempDir;

/// A throwaway store plus a sandbox directory tree, both discarded when
/// the test ends.
pub struct Sandbox {
    pub store: Store,
    dir: TempDir,
}

impl Sandbox {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create sandbox directory");
        let url = format!("sqlite://{}", dir.path().join("portage.db").display());
        let store = Store::configure(&DatabaseSettings {
            url,
            max_connections: 2,
        })
        .await
        .expect("failed to configure store");
        store.run_migrations().await.expect("failed to migrate");
        Self { store, dir }
    }

    /// A path string inside the sandbox that does not exist yet.
    pub fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }
}
