use super::*;

#[test]
fn escape_xml_handles_markup_characters() {
    assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    assert_eq!(escape_xml("plain"), "plain");
}

#[test]
fn raster_strip_has_requested_width() {
    let db = Arc::new(usvg::fontdb::Database::new());
    let r = rasterize_line(&db, "HELLO", 40.0, Rgb8::new(255, 255, 255), 320).unwrap();
    assert_eq!(r.width, 320);
    assert_eq!(r.height, 64);
    assert_eq!(r.rgba8_premul.len(), (320 * 64 * 4) as usize);
}

#[test]
fn rejects_non_positive_size() {
    let db = Arc::new(usvg::fontdb::Database::new());
    assert!(rasterize_line(&db, "x", 0.0, Rgb8::new(0, 0, 0), 10).is_err());
}
