use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Local;
use garde::Validate;
use common_types::{
    Inquiry::{Inquiry, Submission},
    SubmitContact::{Success, SUCCESS_MESSAGE},
    Ip::try_fetch_client_ip,
};

use crate::{
    Response::{ServerResponse, internal_server_error},
    State::AppState,
    Mailer::compose_notification,
    Sheets::append_if_configured,
    Constants,
};

// POST API endpoint
//
// The email is the required side effect, the spreadsheet row is best effort
// and only ever shows up as `sheetUpdated`.
#[tracing::instrument(skip(appstate, headers, body), fields(request="/submit-contact", client_ip = tracing::field::Empty))]
pub async fn request(State(appstate): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Json<Success>, ServerResponse> {
    if let Some(ip) = try_fetch_client_ip(&headers) {
        tracing::Span::current().record("client_ip", tracing::field::display(ip));
    }

    // Parse by hand, the Json extractor would reject with a plain-text 4xx
    let inquiry = serde_json::from_slice::<Inquiry>(&body).map_err(|err| {
        tracing::info!("Failed to parse inquiry, {err}");
        internal_server_error(err)
    })?;
    if let Err(err) = inquiry.validate(&()) {
        tracing::info!("Validation failed with reason: {err}");
        return Err(internal_server_error(err));
    }

    let submission = Submission::new(inquiry, Local::now());

    // 1. Notify by email
    let notification = compose_notification(appstate.mailer.sender(), &submission, appstate.spreadsheet_id.as_deref());
    appstate.mailer.send(&notification).await.map_err(|err| {
        tracing::error!("Failed to send inquiry email, {err}");
        internal_server_error(err)
    })?;
    tracing::info!("Inquiry email sent to {}", Constants::NOTIFICATION_RECIPIENT);

    // 2. Log to the spreadsheet
    let sheet_updated = match append_if_configured(appstate.sheets.as_deref(), &submission.sheet_row()).await {
        Ok(outcome) => outcome.updated(),
        Err(err) => {
            tracing::error!(
                spreadsheet_id = ?appstate.spreadsheet_id,
                "Google Sheets append failed, but email was sent, {err}"
            );
            false
        },
    };

    Ok(Json(Success {
        message: SUCCESS_MESSAGE.to_string(),
        phone: submission.full_phone,
        spreadsheet_id: appstate.spreadsheet_id.clone(),
        sheet_updated,
    }))
}
