use crate::check_monitor::{CheckMessage, create_monitor_channel, spawn_check};
use crate::form::{FormField, ProjectForm};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rankwatch_core::check::CheckEvent;
use rankwatch_core::error::CoreError;
use rankwatch_core::model::Project;
use rankwatch_core::session::{Session, View};
use rankwatch_lookup::RankLookup;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// API key manager modal
#[derive(Debug, Clone, Default)]
pub struct KeyManager {
    pub input: String,
    pub selected: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Modal {
    NewProject(ProjectForm),
    ConfirmDelete { id: String, name: String },
    Keys(KeyManager),
}

pub struct App {
    pub(crate) session: Session,
    lookup: Arc<dyn RankLookup>,
    handle: Handle,
    pub(crate) selected: usize,
    pub(crate) modal: Option<Modal>,
    pub(crate) status: Option<(StatusLevel, String)>,
    running: HashSet<String>,
    tx: mpsc::UnboundedSender<CheckMessage>,
    rx: mpsc::UnboundedReceiver<CheckMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session, lookup: Arc<dyn RankLookup>, handle: Handle) -> Self {
        let (tx, rx) = create_monitor_channel();
        Self {
            session,
            lookup,
            handle,
            selected: 0,
            modal: None,
            status: None,
            running: HashSet::new(),
            tx,
            rx,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_checking(&self, project_id: &str) -> bool {
        self.running.contains(project_id)
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.session.projects().list_all().get(self.selected)
    }

    fn info(&mut self, message: impl Into<String>) {
        self.status = Some((StatusLevel::Info, message.into()));
    }

    fn error(&mut self, message: impl Into<String>) {
        self.status = Some((StatusLevel::Error, message.into()));
    }

    /// Apply everything background checks have reported so far, without blocking
    pub fn process_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                CheckMessage::Progress { project, event } => {
                    if let CheckEvent::KeywordStarted { ref keyword, .. } = event {
                        self.info(format!("Checking \"{}\"...", keyword));
                    }
                    // A project deleted mid-run simply stops receiving updates
                    match self.session.update_project(project) {
                        Ok(()) | Err(CoreError::UnknownProject(_)) => {}
                        Err(e) => self.error(format!("Failed to save progress: {}", e)),
                    }
                }
                CheckMessage::Finished { project_id, result } => {
                    self.running.remove(&project_id);
                    match result {
                        Ok(summary) => self.info(format!(
                            "Check complete: {} succeeded, {} failed",
                            summary.succeeded, summary.failed
                        )),
                        Err(e) => self.error(e),
                    }
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if let Some(modal) = self.modal.take() {
            self.modal = self.handle_modal_key(modal, key);
            return;
        }

        match self.session.view().clone() {
            View::ProjectList => self.handle_list_key(key),
            View::Project(id) => self.handle_project_key(key, &id),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let count = self.session.projects().len();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < count {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_project().map(|p| p.id.clone()) {
                    if let Err(e) = self.session.open_project(&id) {
                        self.error(e.to_string());
                    }
                }
            }
            KeyCode::Char('n') => self.modal = Some(Modal::NewProject(ProjectForm::default())),
            KeyCode::Char('d') => {
                let target = self
                    .selected_project()
                    .map(|p| (p.id.clone(), p.name.clone()));
                if let Some((id, name)) = target {
                    self.modal = Some(Modal::ConfirmDelete { id, name });
                }
            }
            KeyCode::Char('k') => self.modal = Some(Modal::Keys(KeyManager::default())),
            _ => {}
        }
    }

    fn handle_project_key(&mut self, key: KeyEvent, id: &str) {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => self.session.close_project(),
            KeyCode::Char('c') => self.start_check(id),
            KeyCode::Char('k') => self.modal = Some(Modal::Keys(KeyManager::default())),
            KeyCode::Char('d') => {
                if let Some(project) = self.session.active_project() {
                    self.modal = Some(Modal::ConfirmDelete {
                        id: project.id.clone(),
                        name: project.name.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    /// Starts a background check of the project unless one is already running.
    pub fn start_check(&mut self, id: &str) {
        if self.running.contains(id) {
            self.info("A check is already running for this project.");
            return;
        }
        if self.session.credentials().is_empty() {
            self.error(CoreError::NoCredentials.to_string());
            return;
        }
        let Some(project) = self.session.projects().get(id).cloned() else {
            return;
        };

        self.running.insert(project.id.clone());
        self.info(format!("Checking {} keywords...", project.keywords.len()));
        spawn_check(
            &self.handle,
            self.lookup.clone(),
            self.session.shared_credentials(),
            project,
            self.tx.clone(),
        );
    }

    /// Returns the modal to keep open, if any.
    fn handle_modal_key(&mut self, modal: Modal, key: KeyEvent) -> Option<Modal> {
        if key.code == KeyCode::Esc {
            return None;
        }

        match modal {
            Modal::NewProject(form) => self.handle_form_key(form, key),
            Modal::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    self.delete_project(&id);
                    None
                }
                KeyCode::Char('n') | KeyCode::Char('N') => None,
                _ => Some(Modal::ConfirmDelete { id, name }),
            },
            Modal::Keys(manager) => Some(Modal::Keys(self.handle_keys_key(manager, key))),
        }
    }

    fn handle_form_key(&mut self, mut form: ProjectForm, key: KeyEvent) -> Option<Modal> {
        let submit = match key.code {
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Enter => form.focus != FormField::Keywords,
            _ => false,
        };

        if submit {
            return match self.session.create_project(form.to_new_project()) {
                Ok(project) => {
                    self.selected = self.session.projects().len().saturating_sub(1);
                    self.info(format!("Created project {}", project.name));
                    None
                }
                Err(e) => {
                    form.error = Some(e.to_string());
                    Some(Modal::NewProject(form))
                }
            };
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left => form.cycle(false),
            KeyCode::Right => form.cycle(true),
            KeyCode::Enter => form.newline(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
        Some(Modal::NewProject(form))
    }

    fn handle_keys_key(&mut self, mut manager: KeyManager, key: KeyEvent) -> KeyManager {
        let count = self.session.credentials().len();
        match key.code {
            KeyCode::Enter => {
                if !manager.input.trim().is_empty() {
                    match self.session.add_credential(&manager.input) {
                        Ok(()) => {
                            manager.input.clear();
                            manager.error = None;
                        }
                        Err(e) => manager.error = Some(e.to_string()),
                    }
                }
            }
            KeyCode::Up => {
                manager.selected = match manager.selected {
                    _ if count == 0 => None,
                    None => Some(count - 1),
                    Some(i) => Some(i.saturating_sub(1)),
                };
            }
            KeyCode::Down => {
                manager.selected = match manager.selected {
                    _ if count == 0 => None,
                    None => Some(0),
                    Some(i) => Some((i + 1).min(count - 1)),
                };
            }
            KeyCode::Delete => {
                if let Some(index) = manager.selected {
                    match self.session.remove_credential_at(index) {
                        Ok(_) => {
                            let remaining = self.session.credentials().len();
                            manager.selected = if remaining == 0 {
                                None
                            } else {
                                Some(index.min(remaining - 1))
                            };
                            manager.error = None;
                        }
                        Err(e) => manager.error = Some(e.to_string()),
                    }
                }
            }
            KeyCode::Backspace => {
                manager.input.pop();
            }
            KeyCode::Char(c) => manager.input.push(c),
            _ => {}
        }
        manager
    }

    fn delete_project(&mut self, id: &str) {
        match self.session.delete_project(id) {
            Ok(removed) => {
                let count = self.session.projects().len();
                if self.selected >= count {
                    self.selected = count.saturating_sub(1);
                }
                self.info(format!("Deleted project {}", removed.name));
            }
            Err(e) => self.error(e.to_string()),
        }
    }

    /// Keys as shown in the key manager
    pub fn masked_keys(&self) -> Vec<String> {
        self.session.credentials().masked()
    }

    pub fn key_count(&self) -> usize {
        self.session.credentials().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rankwatch_core::data::Database;
    use rankwatch_core::model::{KeywordStatus, NewProject};
    use rankwatch_lookup::error::Result as LookupResult;
    use rankwatch_lookup::{LookupError, RankQuery, RankingOutcome};
    use tempfile::TempDir;

    struct FixedLookup;

    #[async_trait]
    impl RankLookup for FixedLookup {
        async fn lookup_rank(&self, query: &RankQuery, api_key: &str) -> LookupResult<RankingOutcome> {
            if api_key == "bad-key" {
                return Err(LookupError::EmptyResponse("blocked".to_string()).for_keyword(&query.keyword));
            }
            Ok(RankingOutcome::new(format!(
                "Rank: 2 https://{}/{}",
                query.domain, query.keyword
            )))
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn test_app() -> (TempDir, App) {
        let temp = TempDir::new().unwrap();
        let db = Database::new(&temp.path().join("rankwatch.db")).unwrap();
        let app = App::new(Session::load(db), Arc::new(FixedLookup), Handle::current());
        (temp, app)
    }

    fn with_project(app: &mut App, name: &str) -> String {
        app.session
            .create_project(NewProject {
                name: name.to_string(),
                domain: "cafe.example".to_string(),
                keywords: vec!["espresso".to_string(), "latte".to_string()],
                ..Default::default()
            })
            .unwrap()
            .id
    }

    async fn wait_for_check(app: &mut App, id: &str) {
        for _ in 0..200 {
            tokio::task::yield_now().await;
            app.process_messages();
            if !app.is_checking(id) {
                return;
            }
        }
        panic!("check did not finish");
    }

    #[tokio::test]
    async fn test_new_project_form_creates_project() {
        let (_temp, mut app) = test_app();

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Cafe");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "cafe.example");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "espresso");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "latte");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);

        assert!(app.modal().is_none());
        let project = &app.session().projects().list_all()[0];
        assert_eq!(project.keywords, vec!["espresso", "latte"]);
        assert_eq!(project.country, "Vietnam");
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open_with_error() {
        let (_temp, mut app) = test_app();

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Cafe");
        press(&mut app, KeyCode::Enter);

        match app.modal() {
            Some(Modal::NewProject(form)) => assert!(form.error.is_some()),
            other => panic!("expected form, got {:?}", other),
        }
        assert!(app.session().projects().is_empty());
    }

    #[tokio::test]
    async fn test_escape_closes_modal_without_changes() {
        let (_temp, mut app) = test_app();

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Cafe");
        press(&mut app, KeyCode::Esc);

        assert!(app.modal().is_none());
        assert!(app.session().projects().is_empty());
        assert!(!app.should_quit());
    }

    #[tokio::test]
    async fn test_delete_open_project_returns_to_list() {
        let (_temp, mut app) = test_app();
        with_project(&mut app, "Cafe");

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.session().view(), View::Project(_)));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));

        assert_eq!(app.session().view(), &View::ProjectList);
        assert!(app.session().projects().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cancelled() {
        let (_temp, mut app) = test_app();
        with_project(&mut app, "Cafe");

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));

        assert!(app.modal().is_none());
        assert_eq!(app.session().projects().len(), 1);
    }

    #[tokio::test]
    async fn test_key_manager_add_duplicate_and_remove() {
        let (_temp, mut app) = test_app();

        press(&mut app, KeyCode::Char('k'));
        type_text(&mut app, "first-key-1234");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "first-key-1234");
        press(&mut app, KeyCode::Enter);

        match app.modal() {
            Some(Modal::Keys(manager)) => {
                assert_eq!(
                    manager.error.as_deref(),
                    Some("This API key has already been added.")
                );
            }
            other => panic!("expected key manager, got {:?}", other),
        }
        assert_eq!(app.key_count(), 1);
        assert_eq!(app.masked_keys(), vec!["firs...1234"]);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.key_count(), 0);
    }

    #[tokio::test]
    async fn test_check_without_keys_reports_error() {
        let (_temp, mut app) = test_app();
        let id = with_project(&mut app, "Cafe");

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('c'));

        assert!(!app.is_checking(&id));
        let (level, message) = app.status.clone().unwrap();
        assert_eq!(level, StatusLevel::Error);
        assert!(message.contains("Manage API Keys"));
    }

    #[tokio::test]
    async fn test_background_check_updates_and_persists() {
        let (_temp, mut app) = test_app();
        let id = with_project(&mut app, "Cafe");
        app.session.add_credential("bad-key").unwrap();
        app.session.add_credential("good-key").unwrap();

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('c'));
        assert!(app.is_checking(&id));

        // Busy guard: a second press does not start another run
        press(&mut app, KeyCode::Char('c'));

        wait_for_check(&mut app, &id).await;

        let project = app.session().projects().get(&id).unwrap();
        assert!(
            project
                .results
                .iter()
                .all(|r| r.status == KeywordStatus::Success)
        );
        assert_eq!(project.results[0].rank().to_string(), "2");

        let stored = app.session().database().load_projects();
        assert_eq!(stored[0].results, project.results);
    }
}
