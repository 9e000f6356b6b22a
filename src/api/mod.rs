pub mod calculate;
pub mod health;
pub mod results;
pub mod seed;
pub mod templates;
pub mod upload;

use actix_web::{HttpResponse, http::header};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV download; the BOM makes spreadsheet apps pick UTF-8 for Chinese headers.
pub(crate) fn csv_attachment(filename: &str, csv: Vec<u8>) -> HttpResponse {
    let mut body = UTF8_BOM.to_vec();
    body.extend(csv);
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}
