pub mod set_cors_headers;
