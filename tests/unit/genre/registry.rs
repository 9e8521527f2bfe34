use super::*;

#[test]
fn registry_tables_are_valid_and_aligned() {
    validate_registry().unwrap();
    assert_eq!(TEMPLATES.len(), STYLES.len());
    assert!(STYLES.iter().any(|s| s.name == DEFAULT_GENRE));
}

#[test]
fn electronic_matches_known_parameters() {
    let (t, s) = resolve("electronic").unwrap();
    assert_eq!(t.tempo, 128);
    assert_eq!(s.shape_family, ShapeFamily::Geometric);
    assert!((t.beat_duration_secs() - 60.0 / 128.0).abs() < 1e-12);
    assert!(t.accepts_duration(10.0));
    assert!(!t.accepts_duration(9.0));
}

#[test]
fn unknown_genre_style_falls_back_to_electronic() {
    let style = visual_style("polka-trance");
    assert_eq!(style.name, DEFAULT_GENRE);
}

#[test]
fn unknown_genre_template_is_rejected() {
    assert!(matches!(
        genre_template("polka-trance"),
        Err(BeatError::UnknownGenre(name)) if name == "polka-trance"
    ));
    assert!(matches!(
        resolve("polka-trance"),
        Err(BeatError::UnknownGenre(_))
    ));
}

#[test]
fn genre_names_list_every_template() {
    let names: Vec<_> = genre_names().collect();
    assert_eq!(names.first(), Some(&"electronic"));
    assert_eq!(names.len(), TEMPLATES.len());
    for name in names {
        assert!(resolve(name).is_ok(), "{name} must resolve");
    }
}

#[test]
fn template_validation_reports_each_defect() {
    let base = *genre_template("electronic").unwrap();

    let zero_tempo = GenreTemplate { tempo: 0, ..base };
    assert!(matches!(
        zero_tempo.validate(),
        Err(BeatError::InvalidTemplate(_))
    ));

    let empty_scale = GenreTemplate { scale: &[], ..base };
    assert!(empty_scale.validate().is_err());

    let empty_chord = GenreTemplate {
        chord_progression: &[&["C4"], &[]],
        ..base
    };
    assert!(empty_chord.validate().is_err());

    let bad_range = GenreTemplate {
        duration_range: (30, 20),
        ..base
    };
    assert!(bad_range.validate().is_err());

    let bad_pitch = GenreTemplate {
        bass_notes: &["Q2"],
        ..base
    };
    assert!(bad_pitch.validate().is_err());
}

#[test]
fn geometric_styles_draw_hexagons() {
    assert_eq!(ShapeFamily::Geometric.vertex_count(), 6);
    assert_eq!(ShapeFamily::Round.vertex_count(), CIRCLE_VERTICES);
}
