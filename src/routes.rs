use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::{self, Json};
use rocket::{Catcher, Request, Route, State};

use crate::error::ApiError;
use crate::handlers;
use crate::models::{
    CreateRecordRequest, DeleteAck, ErrorBody, Overview, Record, RecordKind, Summary,
};
use crate::store::{RecordStore, SharedStore};

type RecordBody<'r> = Result<Json<CreateRecordRequest>, json::Error<'r>>;

pub fn all() -> Vec<Route> {
    routes![
        health,
        create_spend,
        spend_summary,
        spends_by_sector,
        get_spend,
        delete_spend,
        create_income,
        income_summary,
        incomes_by_sector,
        get_income,
        delete_income,
        overview
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, default_catcher]
}

fn backend(store: &SharedStore) -> &dyn RecordStore {
    &**store
}

fn create(
    store: &SharedStore,
    kind: RecordKind,
    body: RecordBody<'_>,
) -> Result<Created<Json<Record>>, ApiError> {
    let Json(request) = body.map_err(|err| match err {
        json::Error::Io(io) => ApiError::Validation(format!("could not read request body: {io}")),
        json::Error::Parse(_, parse) => {
            ApiError::Validation(format!("invalid request body: {parse}"))
        }
    })?;
    let record = handlers::create_record(backend(store), kind, request)?;
    Ok(Created::new(kind.location(record.id)).body(Json(record)))
}

#[get("/")]
fn health() -> &'static str {
    "Finance tracker API is running"
}

#[post("/api/spends", data = "<body>")]
fn create_spend(
    store: &State<SharedStore>,
    body: RecordBody<'_>,
) -> Result<Created<Json<Record>>, ApiError> {
    create(store, RecordKind::Spend, body)
}

#[get("/api/spends/summary?<month>")]
fn spend_summary(
    store: &State<SharedStore>,
    month: Option<String>,
) -> Result<Json<Summary>, ApiError> {
    handlers::month_summary(backend(store), RecordKind::Spend, month.as_deref()).map(Json)
}

#[get("/api/sectors/<sector>/spends?<month>")]
fn spends_by_sector(
    store: &State<SharedStore>,
    sector: String,
    month: Option<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    handlers::list_by_sector(backend(store), RecordKind::Spend, &sector, month.as_deref()).map(Json)
}

#[get("/api/spends/<id>")]
fn get_spend(store: &State<SharedStore>, id: &str) -> Result<Json<Record>, ApiError> {
    handlers::get_record(backend(store), RecordKind::Spend, id).map(Json)
}

#[delete("/api/spends/<id>")]
fn delete_spend(store: &State<SharedStore>, id: &str) -> Result<Json<DeleteAck>, ApiError> {
    handlers::delete_record(backend(store), RecordKind::Spend, id).map(Json)
}

#[post("/api/incomes", data = "<body>")]
fn create_income(
    store: &State<SharedStore>,
    body: RecordBody<'_>,
) -> Result<Created<Json<Record>>, ApiError> {
    create(store, RecordKind::Income, body)
}

#[get("/api/incomes/summary?<month>")]
fn income_summary(
    store: &State<SharedStore>,
    month: Option<String>,
) -> Result<Json<Summary>, ApiError> {
    handlers::month_summary(backend(store), RecordKind::Income, month.as_deref()).map(Json)
}

#[get("/api/incomes/by-sector/<sector>?<month>")]
fn incomes_by_sector(
    store: &State<SharedStore>,
    sector: String,
    month: Option<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    handlers::list_by_sector(backend(store), RecordKind::Income, &sector, month.as_deref())
        .map(Json)
}

#[get("/api/incomes/<id>")]
fn get_income(store: &State<SharedStore>, id: &str) -> Result<Json<Record>, ApiError> {
    handlers::get_record(backend(store), RecordKind::Income, id).map(Json)
}

#[delete("/api/incomes/<id>")]
fn delete_income(store: &State<SharedStore>, id: &str) -> Result<Json<DeleteAck>, ApiError> {
    handlers::delete_record(backend(store), RecordKind::Income, id).map(Json)
}

#[get("/api/overview?<month>")]
fn overview(
    store: &State<SharedStore>,
    month: Option<String>,
) -> Result<Json<Overview>, ApiError> {
    handlers::month_overview(backend(store), month.as_deref()).map(Json)
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: format!("no route for {} {}", request.method(), request.uri()),
    })
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: status.reason_lossy().to_lowercase(),
    })
}
