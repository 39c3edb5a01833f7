//! In-memory backend used by unit and route tests.

use crate::{
    abstract_trait::BackendClientTrait,
    domain::{
        requests::{CreateUserRequest, DocumentUpload, LoginRequest, QueryRequest, RegisterRequest},
        responses::{
            AnalyticsStats, DocumentMetadata, HealthStatus, LoginResponse, QueryResponse,
            SearchHistoryEntry, Source,
        },
    },
    errors::ClientError,
    model::{Principal, Role},
};
use async_trait::async_trait;
use serde_json::json;
use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

const CREATED_AT: &str = "2024-05-01T10:00:00";

pub fn principal(id: i64, username: &str, role: Role) -> Principal {
    Principal {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        role,
        is_active: true,
        last_login: None,
        created_at: CREATED_AT.to_string(),
    }
}

#[derive(Default)]
struct StubState {
    accounts: HashMap<String, (String, Principal)>,
    tokens: HashMap<String, Principal>,
    documents: Vec<DocumentMetadata>,
    history: Vec<SearchHistoryEntry>,
    issued: usize,
}

/// Backend double. Tokens are issued as `tok1`, `tok2`, ... in login order,
/// and every trait call is counted.
#[derive(Default)]
pub struct StubBackend {
    state: Mutex<StubState>,
    calls: AtomicUsize,
    unreachable: AtomicBool,
}

fn lock(state: &Mutex<StubState>) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `admin`/`admin123` (admin) and `alice`/`secret1` (user).
    pub fn with_default_accounts() -> Self {
        let stub = Self::new();
        stub.add_account(principal(1, "admin", Role::Admin), "admin123");
        stub.add_account(principal(2, "alice", Role::User), "secret1");
        stub
    }

    pub fn add_account(&self, principal: Principal, password: &str) {
        lock(&self.state)
            .accounts
            .insert(principal.username.clone(), (password.to_string(), principal));
    }

    pub fn add_document(&self, document: DocumentMetadata) {
        lock(&self.state).documents.push(document);
    }

    /// Makes the backend reject `token` from now on, as if it had expired.
    pub fn revoke_token(&self, token: &str) {
        lock(&self.state).tokens.remove(token);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user(&self, username: &str) -> Option<Principal> {
        lock(&self.state)
            .accounts
            .get(username)
            .map(|(_, principal)| principal.clone())
    }

    fn enter(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn bearer(&self, token: &str) -> Result<Principal, ClientError> {
        self.enter()?;
        lock(&self.state)
            .tokens
            .get(token)
            .cloned()
            .ok_or(ClientError::Unauthorized)
    }

    fn admin(&self, token: &str) -> Result<Principal, ClientError> {
        let principal = self.bearer(token)?;
        if principal.role != Role::Admin {
            return Err(ClientError::Forbidden);
        }
        Ok(principal)
    }

    fn modify_user(
        &self,
        user_id: i64,
        apply: impl FnOnce(&mut Principal),
    ) -> Result<(), ClientError> {
        let mut state = lock(&self.state);
        let (_, principal) = state
            .accounts
            .values_mut()
            .find(|(_, p)| p.id == user_id)
            .ok_or_else(|| not_found("User not found"))?;
        apply(principal);
        Ok(())
    }
}

fn not_found(detail: &str) -> ClientError {
    ClientError::Status {
        status: 404,
        body: json!({ "detail": detail }).to_string(),
    }
}

fn bad_request(detail: &str) -> ClientError {
    ClientError::Status {
        status: 400,
        body: json!({ "detail": detail }).to_string(),
    }
}

#[async_trait]
impl BackendClientTrait for StubBackend {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.enter()?;
        let mut state = lock(&self.state);

        let principal = match state.accounts.get(&req.username) {
            Some((password, principal)) if *password == req.password && principal.is_active => {
                principal.clone()
            }
            _ => return Err(ClientError::Unauthorized),
        };

        state.issued += 1;
        let token = format!("tok{}", state.issued);
        state.tokens.insert(token.clone(), principal.clone());

        Ok(LoginResponse {
            access_token: token,
            token_type: Some("bearer".into()),
            user: principal,
        })
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Principal, ClientError> {
        self.enter()?;
        let mut state = lock(&self.state);

        if state.accounts.contains_key(&req.username) {
            return Err(bad_request("Username already registered"));
        }

        let id = state.accounts.len() as i64 + 1;
        let mut principal = principal(id, &req.username, req.role);
        principal.email = req.email.clone();
        state
            .accounts
            .insert(req.username.clone(), (req.password.clone(), principal.clone()));

        Ok(principal)
    }

    async fn current_user(&self, token: &str) -> Result<Principal, ClientError> {
        let cached = self.bearer(token)?;
        Ok(self.user(&cached.username).unwrap_or(cached))
    }

    async fn create_user(&self, token: &str, req: &CreateUserRequest) -> Result<(), ClientError> {
        self.admin(token)?;
        let mut state = lock(&self.state);

        if state.accounts.contains_key(&req.username) {
            return Err(bad_request("Username already registered"));
        }

        let id = state.accounts.len() as i64 + 1;
        let mut principal = principal(id, &req.username, req.role);
        principal.email = req.email.clone();
        state
            .accounts
            .insert(req.username.clone(), (req.password.clone(), principal));
        Ok(())
    }

    async fn list_users(&self, token: &str) -> Result<Vec<Principal>, ClientError> {
        self.admin(token)?;
        let mut users: Vec<Principal> = lock(&self.state)
            .accounts
            .values()
            .map(|(_, p)| p.clone())
            .collect();
        users.sort_by_key(|p| p.id);
        Ok(users)
    }

    async fn update_role(&self, token: &str, user_id: i64, role: Role) -> Result<(), ClientError> {
        self.admin(token)?;
        self.modify_user(user_id, |p| p.role = role)
    }

    async fn deactivate_user(&self, token: &str, user_id: i64) -> Result<(), ClientError> {
        self.admin(token)?;
        self.modify_user(user_id, |p| p.is_active = false)
    }

    async fn search_history(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<SearchHistoryEntry>, ClientError> {
        self.bearer(token)?;
        let state = lock(&self.state);
        Ok(state
            .history
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn analytics(&self, token: &str) -> Result<AnalyticsStats, ClientError> {
        self.admin(token)?;
        let state = lock(&self.state);
        Ok(AnalyticsStats {
            total_users: state.accounts.len() as u64,
            total_documents: state.documents.len() as u64,
            search_stats: state
                .history
                .iter()
                .map(|h| json!({ "query": h.query }))
                .collect(),
        })
    }

    async fn upload_document(
        &self,
        token: &str,
        upload: DocumentUpload,
    ) -> Result<DocumentMetadata, ClientError> {
        self.admin(token)?;
        let mut state = lock(&self.state);

        let document = DocumentMetadata {
            id: state.documents.iter().map(|d| d.id).max().unwrap_or(0) + 1,
            filename: Some(upload.file_name.clone()),
            original_filename: Some(upload.file_name),
            file_type: upload.content_type,
            file_size: Some(upload.content.len() as u64),
            total_chunks: Some(1),
            processing_status: Some("completed".into()),
            processed: Some(true),
            created_at: Some(CREATED_AT.into()),
        };
        state.documents.push(document.clone());
        Ok(document)
    }

    async fn list_documents(&self, token: &str) -> Result<Vec<DocumentMetadata>, ClientError> {
        self.bearer(token)?;
        Ok(lock(&self.state).documents.clone())
    }

    async fn delete_document(&self, token: &str, document_id: i64) -> Result<(), ClientError> {
        self.bearer(token)?;
        let mut state = lock(&self.state);
        let before = state.documents.len();
        state.documents.retain(|d| d.id != document_id);
        if state.documents.len() == before {
            return Err(not_found("Document not found"));
        }
        Ok(())
    }

    async fn query(&self, token: &str, req: &QueryRequest) -> Result<QueryResponse, ClientError> {
        self.bearer(token)?;
        let mut state = lock(&self.state);
        state.history.push(SearchHistoryEntry {
            query: req.question.clone(),
            created_at: CREATED_AT.into(),
        });

        let sources = state
            .documents
            .iter()
            .take(req.top_k as usize)
            .map(|d| Source {
                file_name: Some(d.display_name().to_string()),
                chunk_id: Some(json!(0)),
                similarity_score: Some(0.9),
                text: None,
            })
            .collect();

        Ok(QueryResponse {
            answer: None,
            response: Some(format!("answer to: {}", req.question)),
            sources,
        })
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.enter()?;
        Ok(HealthStatus {
            status: "healthy".into(),
        })
    }
}
