use crate::credentials::{CredentialSet, CredentialSource, SharedCredentials};
use crate::data::Database;
use crate::error::{CoreError, Result};
use crate::model::{NewProject, Project};
use crate::store::ProjectStore;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Which screen the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    ProjectList,
    Project(String),
}

/// Everything a front end manipulates: projects, keys and the open project.
/// Each mutating call writes the affected slot through to the database.
pub struct Session {
    db: Database,
    projects: ProjectStore,
    credentials: SharedCredentials,
    view: View,
}

impl Session {
    pub fn load(db: Database) -> Self {
        let projects = ProjectStore::from_projects(db.load_projects());
        let credentials = db.load_credentials().into_shared();
        info!(
            "Loaded {} projects and {} API keys",
            projects.len(),
            credentials.snapshot().len()
        );

        Self {
            db,
            projects,
            credentials,
            view: View::ProjectList,
        }
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // Projects

    pub fn create_project(&mut self, input: NewProject) -> Result<Project> {
        let project = self.projects.create(input)?;
        self.persist_projects()?;
        Ok(project)
    }

    pub fn update_project(&mut self, project: Project) -> Result<()> {
        self.projects.update(project)?;
        self.persist_projects()
    }

    /// Callers must have asked the user for confirmation already.
    pub fn delete_project(&mut self, id: &str) -> Result<Project> {
        let removed = self
            .projects
            .delete(id)
            .ok_or_else(|| CoreError::UnknownProject(id.to_string()))?;

        if self.view == View::Project(removed.id.clone()) {
            self.view = View::ProjectList;
        }

        self.persist_projects()?;
        Ok(removed)
    }

    pub fn open_project(&mut self, id: &str) -> Result<&Project> {
        let id = self.projects.find(id)?.id.clone();
        self.view = View::Project(id);
        self.active_project()
            .ok_or_else(|| CoreError::UnknownProject(String::new()))
    }

    pub fn close_project(&mut self) {
        self.view = View::ProjectList;
    }

    pub fn active_project(&self) -> Option<&Project> {
        match &self.view {
            View::Project(id) => self.projects.get(id),
            View::ProjectList => None,
        }
    }

    // Credentials

    pub fn shared_credentials(&self) -> SharedCredentials {
        self.credentials.clone()
    }

    pub fn credentials(&self) -> RwLockReadGuard<'_, CredentialSet> {
        self.credentials
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn credentials_mut(&self) -> RwLockWriteGuard<'_, CredentialSet> {
        self.credentials
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_credential(&mut self, key: &str) -> Result<()> {
        self.credentials_mut().add(key)?;
        self.persist_credentials()
    }

    pub fn remove_credential(&mut self, key: &str) -> Result<bool> {
        let removed = self.credentials_mut().remove(key);
        if removed {
            self.persist_credentials()?;
        }
        Ok(removed)
    }

    pub fn remove_credential_at(&mut self, index: usize) -> Result<Option<String>> {
        let removed = self.credentials_mut().remove_at(index);
        if removed.is_some() {
            self.persist_credentials()?;
        }
        Ok(removed)
    }

    fn persist_projects(&self) -> Result<()> {
        self.db.save_projects(self.projects.list_all())
    }

    fn persist_credentials(&self) -> Result<()> {
        let snapshot = self.credentials().clone();
        self.db.save_credentials(&snapshot)
    }
}
