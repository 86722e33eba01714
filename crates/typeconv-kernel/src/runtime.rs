//! Sessions for every open project, keyed by project name.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::project::ProjectContext;
use crate::session::{ConverterSession, SessionConfig};

/// Registry of per-project sessions sharing one configuration.
#[derive(Debug, Default)]
pub struct ProjectRuntimes {
    config: SessionConfig,
    sessions: DashMap<String, Arc<ConverterSession>>,
}

impl ProjectRuntimes {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    /// The session for `project`, creating it on first use.
    ///
    /// The session name is the configured name suffixed with the project name.
    pub fn session_for(&self, project: Arc<dyn ProjectContext>) -> Arc<ConverterSession> {
        let name = project.name().to_string();
        let entry = self.sessions.entry(name).or_insert_with(|| {
            let config = SessionConfig {
                name: format!("{}:{}", self.config.name, project.name()),
                ..self.config.clone()
            };
            Arc::new(ConverterSession::new(project, config))
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConverterSession>> {
        self.sessions.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Reset the session for `name`, if one exists. Other projects are untouched.
    pub fn classpath_changed(&self, name: &str) -> bool {
        match self.get(name) {
            Some(session) => {
                info!(project = name, "classpath changed; resetting conversion session");
                session.reset();
                true
            }
            None => false,
        }
    }

    /// Forget the session for a closed project.
    pub fn remove(&self, name: &str) -> Option<Arc<ConverterSession>> {
        self.sessions.remove(name).map(|(_, session)| session)
    }

    /// Names of projects with a live session, sorted.
    pub fn project_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.sessions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::standard_project;

    fn runtimes() -> ProjectRuntimes {
        ProjectRuntimes::new(SessionConfig::named("lsp"))
    }

    #[test]
    fn session_is_created_once_per_project() {
        let runtimes = runtimes();
        let first = runtimes.session_for(Arc::new(standard_project("app")));
        let second = runtimes.session_for(Arc::new(standard_project("app")));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.config().name, "lsp:app");
        assert_eq!(runtimes.len(), 1);
    }

    #[test]
    fn classpath_change_resets_only_that_project() {
        let runtimes = runtimes();
        let app = runtimes.session_for(Arc::new(standard_project("app")));
        let lib = runtimes.session_for(Arc::new(standard_project("lib")));
        app.validator_for("int").unwrap();
        lib.validator_for("int").unwrap();

        assert!(runtimes.classpath_changed("app"));
        assert_eq!(app.cached_validators(), 0);
        assert_eq!(lib.cached_validators(), 1);
        assert!(!runtimes.classpath_changed("unknown"));
    }

    #[test]
    fn removed_sessions_are_recreated_fresh() {
        let runtimes = runtimes();
        let first = runtimes.session_for(Arc::new(standard_project("app")));
        assert!(runtimes.remove("app").is_some());
        assert!(runtimes.is_empty());

        let second = runtimes.session_for(Arc::new(standard_project("app")));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(runtimes.project_names(), vec!["app".to_string()]);
    }
}
