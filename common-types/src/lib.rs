#[allow(non_snake_case)]
pub mod Inquiry {
    use ::std::fmt::Display;
    use chrono::{DateTime, TimeZone};
    use garde::Validate;
    use serde::{Deserialize, Serialize};

    // Matches what the portfolio renders with toLocaleString("en-US", ..., hour12)
    pub const SUBMITTED_AT_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

    /// A single contact-form submission.
    ///
    /// This is the one validation contract for an inquiry, the form and the
    /// handler both check against it.
    #[derive(Deserialize, Serialize, Debug, Clone, Validate)]
    #[serde(rename_all = "camelCase")]
    pub struct Inquiry {
        #[garde(length(min=2, max=100), custom(not_blank))]
        pub name: String,
        #[garde(email, length(max=320))]
        pub email: String,
        #[garde(pattern(r"^\+[0-9]{1,4}$"))]
        pub country_code: String,
        #[garde(pattern(r"^[0-9]{7,15}$"))]
        pub phone: String,
        #[garde(length(min=20, max=5000))]
        pub message: String,
    }

    fn not_blank(value: &str, _: &()) -> garde::Result {
        if value.trim().is_empty() {
            return Err(garde::Error::new("must not be blank"));
        }
        Ok(())
    }

    impl Inquiry {
        pub fn full_phone(&self) -> String {
            format!("{}{}", self.country_code, self.phone)
        }
    }

    /// An inquiry plus the values derived from it once per request.
    #[derive(Debug, Clone)]
    pub struct Submission {
        pub inquiry: Inquiry,
        pub full_phone: String,
        pub submitted_at: String,
    }

    impl Submission {
        pub fn new<Tz>(inquiry: Inquiry, now: DateTime<Tz>) -> Self
        where
            Tz: TimeZone,
            Tz::Offset: Display,
        {
            let full_phone = inquiry.full_phone();
            Submission {
                inquiry,
                full_phone,
                submitted_at: now.format(SUBMITTED_AT_FORMAT).to_string(),
            }
        }

        /// Column order of the collaborations sheet: name, email, phone, inquiry, date.
        pub fn sheet_row(&self) -> Vec<String> {
            vec![
                self.inquiry.name.clone(),
                self.inquiry.email.clone(),
                self.full_phone.clone(),
                self.inquiry.message.clone(),
                self.submitted_at.clone(),
            ]
        }
    }
}

#[allow(non_snake_case)]
pub mod SubmitContact {
    use serde::{Deserialize, Serialize};

    pub const SUCCESS_MESSAGE: &str = "Inquiry submitted successfully! Email sent and data logged.";
    pub const FAILURE_MESSAGE: &str = "Failed to submit inquiry";

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    #[serde(rename_all = "camelCase")]
    pub struct Success {
        pub message: String,
        pub phone: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub spreadsheet_id: Option<String>,
        pub sheet_updated: bool,
    }

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    pub struct Failure {
        pub message: String,
        pub error: String,
    }

    impl Failure {
        pub fn new<E: ToString>(error: E) -> Self {
            let error = error.to_string();
            Failure {
                message: FAILURE_MESSAGE.to_string(),
                error: if error.is_empty() { "Unknown error".to_string() } else { error },
            }
        }
    }
}

#[allow(non_snake_case)]
pub mod Ip {
    // Lambda sits behind API Gateway, so the peer address is never the client.
    // Try the usual proxy headers in order, left-most X-Forwarded-For wins.

    use ::std::net::IpAddr;
    use axum::http::HeaderMap;

    const HEADERS: [&'static str; 4] = [
        "cf-connecting-ip",
        "x-forwarded-for",
        "x-real-ip",
        "true-client-ip",
    ];

    pub fn try_fetch_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
        for header_name in HEADERS {
            let Some(header_value) = headers.get(header_name) else {
                continue
            };
            let Ok(str_header_value) = header_value.to_str() else {
                continue
            };
            let candidate = match header_name {
                "x-forwarded-for" => str_header_value.split(',').next().unwrap_or_default(),
                _ => str_header_value,
            };
            if let Ok(ip) = candidate.trim().parse::<IpAddr>() {
                return Some(ip)
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::Inquiry::{Inquiry, Submission};
    use super::SubmitContact::{Failure, Success};
    use super::Ip::try_fetch_client_ip;
    use axum::http::{HeaderMap, HeaderValue};
    use chrono::{TimeZone, Utc};
    use garde::Validate;

    fn ann() -> Inquiry {
        Inquiry {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            country_code: "+44".to_string(),
            phone: "7911123456".to_string(),
            message: "Need a site rebuilt with booking.".to_string(),
        }
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let inquiry: Inquiry = serde_json::from_str(r#"{
            "name": "Ann",
            "email": "ann@x.com",
            "countryCode": "+1",
            "phone": "5551234567",
            "message": "Need a site rebuilt with booking."
        }"#).unwrap();
        assert_eq!(inquiry.country_code, "+1");
        assert_eq!(inquiry.full_phone(), "+15551234567");
    }

    #[test]
    fn missing_field_fails_to_parse() {
        let result = serde_json::from_str::<Inquiry>(r#"{"name":"Ann","email":"ann@x.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn valid_inquiry_passes() {
        assert!(ann().validate(&()).is_ok());
    }

    #[test]
    fn rejects_bad_email() {
        let mut inquiry = ann();
        inquiry.email = "not-an-email".to_string();
        assert!(inquiry.validate(&()).is_err());
    }

    #[test]
    fn rejects_non_digit_phone() {
        let mut inquiry = ann();
        inquiry.phone = "7911-123456".to_string();
        assert!(inquiry.validate(&()).is_err());
    }

    #[test]
    fn rejects_country_code_without_plus() {
        let mut inquiry = ann();
        inquiry.country_code = "44".to_string();
        assert!(inquiry.validate(&()).is_err());
    }

    #[test]
    fn rejects_short_message_and_blank_name() {
        let mut inquiry = ann();
        inquiry.message = "too short".to_string();
        assert!(inquiry.validate(&()).is_err());

        let mut inquiry = ann();
        inquiry.name = "   ".to_string();
        assert!(inquiry.validate(&()).is_err());
    }

    #[test]
    fn submission_formats_timestamp_and_row() {
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap();
        let submission = Submission::new(ann(), now);
        assert_eq!(submission.submitted_at, "03/07/2026, 02:05:09 PM");
        assert_eq!(submission.sheet_row(), vec![
            "Ann".to_string(),
            "ann@x.com".to_string(),
            "+447911123456".to_string(),
            "Need a site rebuilt with booking.".to_string(),
            "03/07/2026, 02:05:09 PM".to_string(),
        ]);
    }

    #[test]
    fn success_omits_missing_spreadsheet_id() {
        let body = serde_json::to_value(Success {
            message: "ok".to_string(),
            phone: "+15551234567".to_string(),
            spreadsheet_id: None,
            sheet_updated: false,
        }).unwrap();
        assert!(body.get("spreadsheetId").is_none());
        assert_eq!(body["sheetUpdated"], false);
    }

    #[test]
    fn failure_never_has_empty_error() {
        assert_eq!(Failure::new("").error, "Unknown error");
        assert_eq!(Failure::new("boom").message, "Failed to submit inquiry");
    }

    #[test]
    fn client_ip_prefers_left_most_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(try_fetch_client_ip(&headers).unwrap().to_string(), "203.0.113.7");
        assert!(try_fetch_client_ip(&HeaderMap::new()).is_none());
    }

    #[test]
    fn client_ip_skips_unparseable_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("unknown"));
        headers.insert("x-real-ip", HeaderValue::from_static(" 2001:db8::1 "));
        headers.insert("true-client-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(try_fetch_client_ip(&headers).unwrap().to_string(), "2001:db8::1");

        let mut garbage = HeaderMap::new();
        garbage.insert("x-forwarded-for", HeaderValue::from_static("not-an-ip"));
        assert!(try_fetch_client_ip(&garbage).is_none());
    }
}
