// Résumé analysis flow: extracted text is handed to the remote analysis API.
// All remote calls go through analysis_client; handlers never build requests.

pub mod handlers;
