//! Bracket engine web server: JSON API over the in-memory match store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_web::{
    delete, get, post,
    web::{self, Bytes, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use sabo_bracket::import::{read_matches, write_matches};
use sabo_bracket::store::StoreError;
use sabo_bracket::{
    initialize_bracket, validate, FlaggedTournaments, InMemoryMatchStore, IntegrityAlert,
    IntegrityReporter, MatchId, MatchStore, PlayerId, ScoreSubmissionCoordinator, Tournament,
    TournamentError, TournamentId, UserId,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

type Engine = ScoreSubmissionCoordinator<Arc<InMemoryMatchStore>, Arc<FlaggedTournaments>>;

/// Shared engine: the coordinator is the only writer of match state.
type AppState = Data<Engine>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    /// Seeded players in order; 16 fresh ids are generated when omitted.
    #[serde(default)]
    player_ids: Option<Vec<PlayerId>>,
}

#[derive(Deserialize)]
struct SubmitScoreBody {
    score1: i64,
    score2: i64,
    submitted_by: UserId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{match_id}/score)
#[derive(Deserialize)]
struct MatchPath {
    match_id: MatchId,
}

/// Map engine errors to a status code with the usual `{ "error": ... }` body.
fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::MatchNotFound(_) => HttpResponse::NotFound().json(body),
        TournamentError::AlreadyCompleted(_) | TournamentError::MatchNotCompleted(_) => {
            HttpResponse::Conflict().json(body)
        }
        TournamentError::InvalidScore(_)
        | TournamentError::MatchNotReady(_)
        | TournamentError::InvalidSeeding(_)
        | TournamentError::Import(_) => HttpResponse::BadRequest().json(body),
        TournamentError::StructuralIntegrityViolation(violations) => {
            HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "error": e.to_string(),
                "violations": violations,
            }))
        }
        TournamentError::AmbiguousAdvancementTarget { .. } => {
            HttpResponse::InternalServerError().json(body)
        }
        TournamentError::Store(StoreError::TournamentExists(_) | StoreError::Duplicate(_)) => {
            HttpResponse::Conflict().json(body)
        }
        TournamentError::Store(_) => HttpResponse::ServiceUnavailable().json(body),
    }
}

fn no_tournament() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No tournament" }))
}

/// Seeds from a create request. An empty body or a missing `player_ids` means 16
/// fresh players; anything else must parse.
fn seeds_from_body(body: &[u8]) -> Result<Vec<PlayerId>, serde_json::Error> {
    let requested = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        serde_json::from_slice::<CreateTournamentBody>(body)?.player_ids
    };
    Ok(requested.unwrap_or_else(|| (0..16).map(|_| Uuid::new_v4()).collect()))
}

/// Rows of a tournament, or a ready-made error response when it does not exist.
fn load(state: &AppState, id: TournamentId) -> Result<Tournament, HttpResponse> {
    match state.store().get_matches(id) {
        Ok(rows) if rows.is_empty() => Err(no_tournament()),
        Ok(rows) => Ok(Tournament::new(id, rows)),
        Err(e) => Err(error_response(&TournamentError::from(e))),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "sabo-bracket",
    })
}

/// Create a tournament: 27 rows with round 1 seeded from `player_ids`.
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Bytes) -> HttpResponse {
    let seeds = match seeds_from_body(&body) {
        Ok(s) => s,
        Err(e) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    };
    let id = Uuid::new_v4();
    let matches = match initialize_bracket(id, &seeds) {
        Ok(m) => m,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = state.store().insert_matches(matches) {
        return error_response(&TournamentError::from(e));
    }
    log::info!("Created tournament {}", id);
    match state.organize(id) {
        Ok(organized) => HttpResponse::Ok().json(serde_json::json!({ "id": id, "bracket": organized })),
        Err(e) => error_response(&e),
    }
}

/// Bracket grouped by segment.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(resp) = load(&state, path.id) {
        return resp;
    }
    match state.organize(path.id) {
        Ok(organized) => HttpResponse::Ok().json(organized),
        Err(e) => error_response(&e),
    }
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.store().remove_tournament(path.id) {
        Ok(0) => no_tournament(),
        Ok(n) => {
            state.reporter().clear(path.id);
            log::info!("Removed tournament {} ({} rows)", path.id, n);
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(&TournamentError::from(e)),
    }
}

#[get("/api/tournaments/{id}/progress")]
async fn api_progress(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let tournament = match load(&state, path.id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    HttpResponse::Ok().json(sabo_bracket::progress(&tournament.matches))
}

/// Matches that accept a score now.
#[get("/api/tournaments/{id}/playable")]
async fn api_playable(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(resp) = load(&state, path.id) {
        return resp;
    }
    match state.playable(path.id) {
        Ok(playable) => HttpResponse::Ok().json(playable),
        Err(e) => error_response(&e),
    }
}

/// Full structural diagnostic. A failing report also flags the tournament.
#[get("/api/tournaments/{id}/validate")]
async fn api_validate(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(resp) = load(&state, path.id) {
        return resp;
    }
    match state.validate(path.id) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

/// Re-apply every ungated advancement (repairs lost slot writes).
#[post("/api/tournaments/{id}/reconcile")]
async fn api_reconcile(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(resp) = load(&state, path.id) {
        return resp;
    }
    match state.reconcile(path.id) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

/// Bulk import of a tournament's rows from CSV. Rows are stored only if the set validates.
#[post("/api/tournaments/{id}/import")]
async fn api_import(state: AppState, path: Path<TournamentPath>, body: Bytes) -> HttpResponse {
    let id = path.id;
    let matches = match read_matches(body.as_ref(), Some(id)) {
        Ok(m) => m,
        Err(e) => return error_response(&TournamentError::from(e)),
    };
    let report = validate(&matches);
    if !report.ok {
        let err = TournamentError::StructuralIntegrityViolation(report.violations);
        if let Some(alert) = IntegrityAlert::from_error(id, &err) {
            state.reporter().flag(alert);
        }
        return error_response(&err);
    }
    let count = matches.len();
    // The store refuses the rows if the tournament already exists.
    if let Err(e) = state.store().insert_matches(matches) {
        return error_response(&TournamentError::from(e));
    }
    log::info!("Imported tournament {} ({} rows)", id, count);
    HttpResponse::Ok().json(report)
}

#[get("/api/tournaments/{id}/export.csv")]
async fn api_export(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let tournament = match load(&state, path.id) {
        Ok(t) => t,
        Err(resp) => return resp,
    };
    let mut buf = Vec::new();
    if let Err(e) = write_matches(&mut buf, &tournament.matches) {
        return HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }));
    }
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .body(buf)
}

/// Submit the score of a ready match; advances winner and loser.
#[post("/api/matches/{match_id}/score")]
async fn api_submit_score(state: AppState, path: Path<MatchPath>, body: Json<SubmitScoreBody>) -> HttpResponse {
    match state.submit(path.match_id, body.score1, body.score2, body.submitted_by) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => error_response(&e),
    }
}

/// Retry advancement for one completed match.
#[post("/api/matches/{match_id}/advance")]
async fn api_advance(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    match state.advance(path.match_id) {
        Ok(applied) => HttpResponse::Ok().json(applied),
        Err(e) => error_response(&e),
    }
}

/// Tournaments flagged for manual reconciliation.
#[get("/api/admin/flags")]
async fn api_list_flags(state: AppState) -> HttpResponse {
    let flags: Vec<_> = state
        .reporter()
        .all()
        .into_iter()
        .map(|(id, alerts)| serde_json::json!({ "tournament_id": id, "alerts": alerts }))
        .collect();
    HttpResponse::Ok().json(flags)
}

/// Acknowledge a flag once the tournament has been reconciled by hand.
#[delete("/api/admin/flags/{id}")]
async fn api_clear_flag(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    if state.reporter().clear(path.id) {
        log::info!("Cleared integrity flag on tournament {}", path.id);
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(serde_json::json!({ "error": "Tournament is not flagged" }))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(ScoreSubmissionCoordinator::new(
        Arc::new(InMemoryMatchStore::new()),
        Arc::new(FlaggedTournaments::new()),
    ));

    HttpServer::new(move || {
        // Malformed bodies (e.g. fractional scores) get the same JSON error shape.
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            let resp = HttpResponse::BadRequest().json(serde_json::json!({ "error": err.to_string() }));
            actix_web::error::InternalError::from_response(err, resp).into()
        });
        App::new()
            .app_data(state.clone())
            .app_data(json_config)
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_delete_tournament)
            .service(api_progress)
            .service(api_playable)
            .service(api_validate)
            .service(api_reconcile)
            .service(api_import)
            .service(api_export)
            .service(api_submit_score)
            .service(api_advance)
            .service(api_list_flags)
            .service(api_clear_flag)
    })
    .bind(bind)?
    .run()
    .await
}
