//! Print the OpenAPI document as JSON.

use carbon_api::doc::openapi_document;

#[expect(clippy::print_stdout, reason = "the document is written to stdout")]
fn main() -> Result<(), serde_json::Error> {
    let document = openapi_document()?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
