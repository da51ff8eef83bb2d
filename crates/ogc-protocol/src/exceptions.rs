//! OGC ServiceExceptionReport decoding.
//!
//! OGC servers report errors inside an XML document that is usually sent
//! with HTTP 200:
//!
//! ```xml
//! <ServiceExceptionReport version="1.2.0" xmlns="http://www.opengis.net/ogc">
//!   <ServiceException code="InvalidParameterValue">bad layer</ServiceException>
//! </ServiceExceptionReport>
//! ```

use ogc_common::{ExceptionRecord, OgcResult};

use crate::xml::{parse_document, XmlElement};

/// OGC namespace used by WMS 1.3.0 / WFS 1.x exception reports.
pub const OGC_NAMESPACE: &str = "http://www.opengis.net/ogc";

/// Root element of an exception report.
pub const EXCEPTION_REPORT_ROOT: &str = "ServiceExceptionReport";

const EXCEPTION_REPORT_PREFIX: &str = "<ServiceExceptionReport";

/// Fast-path check: does the payload begin with the report tag?
///
/// Leading whitespace and a byte order mark are ignored. Reports that start
/// with an XML declaration are not recognised here; use
/// [`is_exception_report`] on a parsed document for those.
pub fn starts_with_exception_report(text: &str) -> bool {
    text.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with(EXCEPTION_REPORT_PREFIX)
}

/// Whether a parsed document is an exception report.
pub fn is_exception_report(doc: &XmlElement) -> bool {
    doc.is(EXCEPTION_REPORT_ROOT)
}

/// Decode every `ServiceException` in a report, in document order.
///
/// Elements in the OGC namespace and unqualified elements both count, since
/// many servers omit the namespace declaration. A report without any
/// exception elements yields an empty list.
pub fn decode_exception_report(xml: &str) -> OgcResult<Vec<ExceptionRecord>> {
    let doc = parse_document(xml)?;
    Ok(exception_records(&doc))
}

/// Extract exception records from an already parsed document.
pub fn exception_records(doc: &XmlElement) -> Vec<ExceptionRecord> {
    doc.descendants()
        .into_iter()
        .filter(|e| e.is("ServiceException") && in_ogc_namespace(e))
        .map(|e| {
            ExceptionRecord::new(
                e.text_content().trim(),
                e.attribute("code").map(str::to_string),
            )
        })
        .collect()
}

fn in_ogc_namespace(element: &XmlElement) -> bool {
    match element.namespace.as_deref() {
        None => true,
        Some(ns) => ns == OGC_NAMESPACE,
    }
}
