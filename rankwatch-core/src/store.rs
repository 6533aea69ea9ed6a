use crate::error::{CoreError, Result};
use crate::model::{DEFAULT_COUNTRY, KeywordResult, NewProject, Project};
use tracing::debug;

/// Projects in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: Vec<Project>,
}

impl ProjectStore {
    pub fn from_projects(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn create(&mut self, input: NewProject) -> Result<Project> {
        let name = input.name.trim();
        let domain = input.domain.trim();

        if name.is_empty() {
            return Err(CoreError::Validation("project name is required".to_string()));
        }
        if domain.is_empty() {
            return Err(CoreError::Validation("domain is required".to_string()));
        }

        let keywords: Vec<String> = input
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if keywords.is_empty() {
            return Err(CoreError::NoKeywords);
        }

        let country = match input.country.trim() {
            "" => DEFAULT_COUNTRY.to_string(),
            c => c.to_string(),
        };

        let city = input
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let project = Project {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            domain: domain.to_string(),
            results: keywords.iter().map(KeywordResult::pending).collect(),
            keywords,
            device: input.device,
            country,
            city,
        };

        debug!("Created project {} ({})", project.name, project.id);
        self.projects.push(project.clone());
        Ok(project)
    }

    /// Replaces the stored project with the same id wholesale.
    pub fn update(&mut self, project: Project) -> Result<()> {
        if !project.is_aligned() {
            return Err(CoreError::MisalignedResults {
                id: project.id,
                keywords: project.keywords.len(),
                results: project.results.len(),
            });
        }

        let slot = self
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| CoreError::UnknownProject(project.id.clone()))?;
        *slot = project;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Option<Project> {
        let idx = self.projects.iter().position(|p| p.id == id)?;
        Some(self.projects.remove(idx))
    }

    pub fn list_all(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Exact id, or a prefix that matches exactly one project.
    pub fn find(&self, id_or_prefix: &str) -> Result<&Project> {
        if let Some(project) = self.get(id_or_prefix) {
            return Ok(project);
        }

        let mut matches = self
            .projects
            .iter()
            .filter(|p| !id_or_prefix.is_empty() && p.id.starts_with(id_or_prefix));

        match (matches.next(), matches.next()) {
            (Some(project), None) => Ok(project),
            (Some(_), Some(_)) => Err(CoreError::AmbiguousProject(id_or_prefix.to_string())),
            _ => Err(CoreError::UnknownProject(id_or_prefix.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn into_projects(self) -> Vec<Project> {
        self.projects
    }
}
