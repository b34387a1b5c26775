//! In-process stand-in for the backend, used by the client tests.
//!
//! Serves the same routes and status codes as the real API from an in-memory store,
//! counts every request it receives, and can delay one person's card response to
//! provoke out-of-order completions.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

pub(crate) const TOKEN: &str = "test-token";
pub(crate) const PASSWORD: &str = "secret";

struct StoredVaccination {
    id: i64,
    person_id: i64,
    vaccine_id: i64,
    dose: String,
    date: String,
}

struct Db {
    persons: Vec<(i64, String, String)>,
    vaccines: Vec<(i64, String, String)>,
    vaccinations: Vec<StoredVaccination>,
    next_id: i64,
}

impl Db {
    fn seeded() -> Self {
        Self {
            persons: vec![
                (1, "Maria da Silva".into(), "111".into()),
                (2, "João Souza".into(), "222".into()),
            ],
            vaccines: vec![
                (1, "BCG".into(), "Nacional".into()),
                (2, "HEPATITE B".into(), "Nacional".into()),
                (3, "HPV".into(), "Especial".into()),
            ],
            vaccinations: vec![
                StoredVaccination {
                    id: 10,
                    person_id: 1,
                    vaccine_id: 1,
                    dose: "BCG".into(),
                    date: "2024-01-10T00:00:00".into(),
                },
                StoredVaccination {
                    id: 11,
                    person_id: 1,
                    vaccine_id: 2,
                    dose: "1a Dose".into(),
                    date: "2024-01-10T00:00:00".into(),
                },
            ],
            next_id: 100,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn person_json(&self, id: i64) -> Option<Value> {
        self.persons
            .iter()
            .find(|p| p.0 == id)
            .map(|(id, nome, num)| json!({"id": id, "nome": nome, "numero_identificacao": num}))
    }
}

#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Db>>,
    requests: Arc<AtomicUsize>,
    slow_person: Option<i64>,
}

impl AppState {
    fn db(&self) -> MutexGuard<'_, Db> {
        self.db.lock().expect("fake backend lock")
    }

    /// Count the request and enforce the bearer token.
    fn enter(&self, headers: &HeaderMap) -> Result<(), Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let expected = format!("Bearer {TOKEN}");
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(value) if value == expected => Ok(()),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"msg": "Missing Authorization Header"})),
            )
                .into_response()),
        }
    }
}

pub(crate) struct FakeBackend {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
}

impl FakeBackend {
    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub(crate) async fn spawn(slow_person: Option<i64>) -> FakeBackend {
    let requests = Arc::new(AtomicUsize::new(0));
    let state = AppState {
        db: Arc::new(Mutex::new(Db::seeded())),
        requests: requests.clone(),
        slow_person,
    };

    let app = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/pessoas", get(list_persons).post(create_person))
        .route("/pessoas/:id", get(get_person).delete(delete_person))
        .route("/pessoas/:id/cartao_vacinacao", get(card))
        .route("/vacinas", get(list_vaccines).post(create_vaccine))
        .route("/vacinas/:id", delete(delete_vaccine))
        .route("/vacinacoes", post(create_vaccination))
        .route("/vacinacoes/:id", delete(delete_vaccination))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve fake backend");
    });

    FakeBackend {
        base_url: format!("http://{addr}"),
        requests,
    }
}

type HandlerResult = Result<Response, Response>;

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": message}))).into_response()
}

async fn login(State(state): State<AppState>, Json(body): Json<Value>) -> HandlerResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if body["password"] == PASSWORD {
        Ok(Json(json!({"access_token": TOKEN})).into_response())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Credenciais inválidas."})),
        )
            .into_response())
    }
}

async fn register(State(state): State<AppState>, Json(_body): Json<Value>) -> HandlerResult {
    state.requests.fetch_add(1, Ordering::SeqCst);
    Ok((StatusCode::CREATED, Json(json!({"access_token": TOKEN}))).into_response())
}

async fn list_persons(State(state): State<AppState>, headers: HeaderMap) -> HandlerResult {
    state.enter(&headers)?;
    let db = state.db();
    let persons: Vec<Value> = db.persons.iter().filter_map(|p| db.person_json(p.0)).collect();
    Ok(Json(persons).into_response())
}

async fn get_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HandlerResult {
    state.enter(&headers)?;
    let db = state.db();
    db.person_json(id)
        .map(|p| Json(p).into_response())
        .ok_or_else(|| not_found("Pessoa não encontrada."))
}

async fn create_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    state.enter(&headers)?;
    let mut db = state.db();
    let nome = body["nome"].as_str().unwrap_or_default().to_string();
    let num = body["numero_identificacao"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    if db.persons.iter().any(|p| p.2 == num) {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({
                "message": format!("Pessoa com número de identificação '{num}' já existe.")
            })),
        )
            .into_response());
    }
    let id = db.next_id();
    db.persons.push((id, nome, num));
    let created = db.person_json(id).unwrap_or_default();
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn delete_person(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HandlerResult {
    state.enter(&headers)?;
    let mut db = state.db();
    if !db.persons.iter().any(|p| p.0 == id) {
        return Err(not_found("Pessoa não encontrada."));
    }
    db.persons.retain(|p| p.0 != id);
    db.vaccinations.retain(|v| v.person_id != id);
    Ok(Json(json!({"message": "Pessoa e seu cartão de vacinação removidos com sucesso."}))
        .into_response())
}

async fn card(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HandlerResult {
    state.enter(&headers)?;
    if state.slow_person == Some(id) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    let db = state.db();
    let person = db
        .person_json(id)
        .ok_or_else(|| not_found("Pessoa não encontrada."))?;

    let registrations: Vec<Value> = db
        .vaccines
        .iter()
        .filter_map(|(vaccine_id, nome, _)| {
            let doses: Vec<Value> = db
                .vaccinations
                .iter()
                .filter(|v| v.person_id == id && v.vaccine_id == *vaccine_id)
                .map(|v| {
                    json!({
                        "id_vacinacao": v.id,
                        "dose_aplicada": v.dose,
                        "data_aplicacao": v.date,
                    })
                })
                .collect();
            (!doses.is_empty()).then(|| json!({"nome_vacina": nome, "doses": doses}))
        })
        .collect();

    Ok(Json(json!({"pessoa": person, "vacinas_registradas": registrations})).into_response())
}

async fn list_vaccines(State(state): State<AppState>, headers: HeaderMap) -> HandlerResult {
    state.enter(&headers)?;
    let db = state.db();
    let vaccines: Vec<Value> = db
        .vaccines
        .iter()
        .map(|(id, nome, categoria)| json!({"id": id, "nome": nome, "categoria": categoria}))
        .collect();
    Ok(Json(vaccines).into_response())
}

async fn create_vaccine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    state.enter(&headers)?;
    let mut db = state.db();
    let nome = body["nome"].as_str().unwrap_or_default().to_string();
    let categoria = body["categoria"].as_str().unwrap_or_default().to_string();
    if db.vaccines.iter().any(|v| v.1 == nome) {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({"message": format!("Vacina '{nome}' já existe.")})),
        )
            .into_response());
    }
    let id = db.next_id();
    db.vaccines.push((id, nome.clone(), categoria.clone()));
    Ok((
        StatusCode::CREATED,
        Json(json!({"id": id, "nome": nome, "categoria": categoria})),
    )
        .into_response())
}

async fn delete_vaccine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HandlerResult {
    state.enter(&headers)?;
    let mut db = state.db();
    if !db.vaccines.iter().any(|v| v.0 == id) {
        return Err(not_found("Vacina não encontrada."));
    }
    db.vaccines.retain(|v| v.0 != id);
    db.vaccinations.retain(|v| v.vaccine_id != id);
    Ok(Json(json!({"message": "Vacina removida com sucesso."})).into_response())
}

async fn create_vaccination(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    state.enter(&headers)?;
    let mut db = state.db();
    let person_id = body["pessoa_id"].as_i64().unwrap_or_default();
    let vaccine_id = body["vacina_id"].as_i64().unwrap_or_default();
    let dose = body["dose_aplicada"].as_str().unwrap_or_default().to_string();
    let date = body["data_aplicacao"].as_str().unwrap_or_default().to_string();

    if db
        .vaccinations
        .iter()
        .any(|v| v.person_id == person_id && v.vaccine_id == vaccine_id && v.dose == dose)
    {
        return Err((
            StatusCode::CONFLICT,
            Json(json!({
                "message": "Dose já registrada para esta vacina.",
                "errors": {"dose_aplicada": ["duplicada"]}
            })),
        )
            .into_response());
    }

    let id = db.next_id();
    db.vaccinations.push(StoredVaccination {
        id,
        person_id,
        vaccine_id,
        dose: dose.clone(),
        date: date.clone(),
    });
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "pessoa_id": person_id,
            "vacina_id": vaccine_id,
            "dose_aplicada": dose,
            "data_aplicacao": date,
        })),
    )
        .into_response())
}

async fn delete_vaccination(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> HandlerResult {
    state.enter(&headers)?;
    let mut db = state.db();
    if !db.vaccinations.iter().any(|v| v.id == id) {
        return Err(not_found("Vacinação não encontrada."));
    }
    db.vaccinations.retain(|v| v.id != id);
    Ok(Json(json!({"message": "Vacinação removida com sucesso."})).into_response())
}
