use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use glyphs_kerning::{
    adjust_pairs_involving, copy_group_values, copy_sidebearings, GlyphScope, GlyphTimer,
    KerningError, KerningKey, SourceSet,
};

const METAINFO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>creator</key>
	<string>com.example.editor</string>
	<key>formatVersion</key>
	<integer>3</integer>
</dict>
</plist>
"#;

fn name(name: &str) -> norad::Name {
    norad::Name::new(name).unwrap()
}

/// A closed rectangle whose first point is named `corner`.
fn rectangle(x0: f64, x1: f64) -> norad::Contour {
    let point = |x, y, point_name: Option<&str>| {
        norad::ContourPoint::new(
            x,
            y,
            norad::PointType::Line,
            false,
            point_name.map(name),
            None,
            None,
        )
    };
    norad::Contour::new(
        vec![
            point(x0, 0.0, Some("corner")),
            point(x1, 0.0, None),
            point(x1, 700.0, None),
            point(x0, 700.0, None),
        ],
        None,
        None,
    )
}

/// A UFO with glyphs A, AE, Aacute, H, T, o; A and Aacute share the left
/// group A and T is in the right group T.
fn write_ufo(dir: &Path, file_name: &str, style_name: &str, a_t: f64) -> PathBuf {
    let mut ufo = norad::Font::new();
    ufo.font_info.family_name = Some("Test".into());
    ufo.font_info.style_name = Some(style_name.into());
    for glyph_name in ["A", "AE", "Aacute", "H", "T", "o"] {
        let mut glyph = norad::Glyph::new(glyph_name);
        glyph.width = 600.0;
        if glyph_name == "H" {
            glyph.width = 640.0;
            glyph.contours.push(rectangle(40.0, 560.0));
        }
        ufo.default_layer_mut().insert_glyph(glyph);
    }
    ufo.groups
        .insert(name("public.kern1.A"), vec![name("A"), name("Aacute")]);
    ufo.groups.insert(name("public.kern2.T"), vec![name("T")]);
    ufo.kerning.insert(
        name("public.kern1.A"),
        BTreeMap::from([(name("public.kern2.T"), a_t), (name("o"), -10.0)]),
    );
    ufo.kerning
        .insert(name("H"), BTreeMap::from([(name("H"), 4.0)]));

    let path = dir.join(file_name);
    ufo.save(&path).unwrap();
    fs::write(path.join("metainfo.plist"), METAINFO).unwrap();
    path
}

fn write_designspace(dir: &Path) -> PathBuf {
    write_ufo(dir, "Test-Regular.ufo", "Regular", -20.0);
    write_ufo(dir, "Test-Bold.ufo", "Bold", -30.0);
    let path = dir.join("Test.designspace");
    fs::write(
        &path,
        r#"<?xml version='1.0' encoding='UTF-8'?>
<designspace format="4.1">
  <axes>
    <axis tag="wght" name="Weight" minimum="400" maximum="700" default="400"/>
  </axes>
  <sources>
    <source filename="Test-Regular.ufo" name="Test Regular" familyname="Test" stylename="Regular">
      <location>
        <dimension name="Weight" xvalue="400"/>
      </location>
    </source>
    <source filename="Test-Bold.ufo" name="Test Bold" familyname="Test" stylename="Bold">
      <location>
        <dimension name="Weight" xvalue="700"/>
      </location>
    </source>
  </sources>
</designspace>
"#,
    )
    .unwrap();
    path
}

fn kerning(ufo: &norad::Font, left: &str, right: &str) -> Option<f64> {
    ufo.kerning
        .get(&name(left))
        .and_then(|row| row.get(&name(right)))
        .copied()
}

#[test]
fn single_ufo_loads_groups_and_kerning() {
    let dir = tempfile::tempdir().unwrap();
    let ufo_path = write_ufo(dir.path(), "Test-Regular.ufo", "Regular", -20.0);

    let font = SourceSet::load(&ufo_path).unwrap().font();

    assert_eq!(font.font_master.len(), 1);
    assert_eq!(font.font_master[0].name, "Regular");
    assert_eq!(font.glyphs.len(), 6);
    let aacute = font.get_glyph("Aacute").unwrap();
    assert_eq!(aacute.left_kerning_group.as_deref(), Some("A"));
    assert_eq!(aacute.right_kerning_group, None);
    assert_eq!(aacute.layers.len(), 1);

    let table = font.kerning_for(&font.font_master[0].id).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.get(&KerningKey::left_group("A"), &KerningKey::right_group("T")),
        -20.0
    );
    assert_eq!(
        table.get(&KerningKey::glyph("H"), &KerningKey::glyph("H")),
        4.0
    );
}

#[test]
fn adjust_is_saved_back_into_the_ufo() {
    let dir = tempfile::tempdir().unwrap();
    let ufo_path = write_ufo(dir.path(), "Test-Regular.ufo", "Regular", -20.0);

    let mut sources = SourceSet::load(&ufo_path).unwrap();
    let mut font = sources.font();
    let report = adjust_pairs_involving(&mut font, "Regular", &["Aacute"], 5.0).unwrap();
    assert_eq!(report.total, 2);
    sources.apply(&font).unwrap();
    sources.save().unwrap();

    let ufo = norad::Font::load(&ufo_path).unwrap();
    assert_eq!(kerning(&ufo, "public.kern1.A", "public.kern2.T"), Some(-15.0));
    assert_eq!(kerning(&ufo, "public.kern1.A", "o"), Some(-5.0));
    assert_eq!(kerning(&ufo, "H", "H"), Some(4.0));
    assert_eq!(
        ufo.groups.get(&name("public.kern1.A")),
        Some(&vec![name("A"), name("Aacute")])
    );
    assert_eq!(
        fs::read_to_string(ufo_path.join("metainfo.plist")).unwrap(),
        METAINFO
    );
}

#[test]
fn copy_groups_across_designspace_masters() {
    let dir = tempfile::tempdir().unwrap();
    let designspace_path = write_designspace(dir.path());

    let mut sources = SourceSet::load(&designspace_path).unwrap();
    let mut font = sources.font();
    let masters: Vec<String> = font.font_master.iter().map(|m| m.name.clone()).collect();
    assert_eq!(masters, vec!["Regular", "Bold"]);

    let report = copy_group_values(&mut font, &masters, "A", "AE");
    assert_eq!(report.copied, 4);
    assert_eq!(report.changed, 4);
    assert!(report.failures.is_empty());
    sources.apply(&font).unwrap();
    sources.save().unwrap();

    let bold = norad::Font::load(dir.path().join("Test-Bold.ufo")).unwrap();
    assert_eq!(kerning(&bold, "public.kern1.AE", "public.kern2.T"), Some(-30.0));
    assert_eq!(kerning(&bold, "public.kern1.AE", "o"), Some(-10.0));
    assert_eq!(kerning(&bold, "public.kern1.A", "public.kern2.T"), Some(-30.0));
    // The new group is referenced by kerning, so it has to exist.
    assert_eq!(bold.groups.get(&name("public.kern1.AE")), Some(&vec![]));

    let regular = norad::Font::load(dir.path().join("Test-Regular.ufo")).unwrap();
    assert_eq!(
        kerning(&regular, "public.kern1.AE", "public.kern2.T"),
        Some(-20.0)
    );

    // Running it again on the saved sources changes nothing.
    let mut font = SourceSet::load(&designspace_path).unwrap().font();
    assert_eq!(copy_group_values(&mut font, &masters, "A", "AE").changed, 0);
}

#[test]
fn sidebearings_only_rewrite_changed_glyphs() {
    let dir = tempfile::tempdir().unwrap();
    let source_dir = dir.path().join("source");
    let destination_dir = dir.path().join("destination");
    fs::create_dir_all(&source_dir).unwrap();
    fs::create_dir_all(&destination_dir).unwrap();
    let source_path = write_ufo(&source_dir, "Source.ufo", "Regular", 0.0);
    let destination_path = write_ufo(&destination_dir, "Destination.ufo", "Regular", 0.0);

    {
        let mut ufo = norad::Font::load(&source_path).unwrap();
        let h = ufo.default_layer_mut().get_glyph_mut("H").unwrap();
        h.width = 700.0;
        h.contours = vec![rectangle(80.0, 620.0)];
        ufo.save(&source_path).unwrap();
    }

    let source = SourceSet::load(&source_path).unwrap().font();
    let mut destination_sources = SourceSet::load(&destination_path).unwrap();
    let mut destination = destination_sources.font();
    let report = copy_sidebearings(
        &source,
        &mut destination,
        &GlyphScope::Selected(vec!["H".into()]),
    )
    .unwrap();
    assert_eq!(report.copied, vec!["H"]);
    destination_sources.apply(&destination).unwrap();
    destination_sources.save().unwrap();

    let ufo = norad::Font::load(&destination_path).unwrap();
    let h = ufo.default_layer().get_glyph("H").unwrap();
    assert_eq!(h.width, 680.0);
    let min_x = h.contours[0]
        .points
        .iter()
        .map(|p| p.x)
        .fold(f64::INFINITY, f64::min);
    assert_eq!(min_x, 80.0);
    let point_names: Vec<Option<&str>> = h.contours[0]
        .points
        .iter()
        .map(|p| p.name.as_ref().map(|n| n.as_str()))
        .collect();
    assert_eq!(point_names, vec![Some("corner"), None, None, None]);
    assert_eq!(ufo.default_layer().get_glyph("o").unwrap().width, 600.0);
}

/// Replace the groups of the UFO at `path`.
fn set_groups(path: &Path, groups: &[(&str, &[&str])]) {
    let mut ufo = norad::Font::load(path).unwrap();
    ufo.groups = groups
        .iter()
        .map(|(group, members)| (name(group), members.iter().map(|m| name(m)).collect()))
        .collect();
    ufo.save(path).unwrap();
}

#[test]
fn kern_group_members_outside_the_font_survive() {
    let dir = tempfile::tempdir().unwrap();
    let ufo_path = write_ufo(dir.path(), "Test-Regular.ufo", "Regular", -20.0);
    set_groups(
        &ufo_path,
        &[
            ("public.kern1.A", &["Adieresis", "Aacute", "A"]),
            ("public.kern2.T", &["T", "Tcedilla"]),
            ("uppercase", &["A", "T"]),
        ],
    );

    let mut sources = SourceSet::load(&ufo_path).unwrap();
    let mut font = sources.font();
    adjust_pairs_involving(&mut font, "Regular", &["A"], 5.0).unwrap();
    sources.apply(&font).unwrap();
    sources.save().unwrap();

    let ufo = norad::Font::load(&ufo_path).unwrap();
    assert_eq!(kerning(&ufo, "public.kern1.A", "public.kern2.T"), Some(-15.0));
    assert_eq!(
        ufo.groups.get(&name("public.kern1.A")),
        Some(&vec![name("Adieresis"), name("Aacute"), name("A")])
    );
    assert_eq!(
        ufo.groups.get(&name("public.kern2.T")),
        Some(&vec![name("T"), name("Tcedilla")])
    );
    assert_eq!(
        ufo.groups.get(&name("uppercase")),
        Some(&vec![name("A"), name("T")])
    );
}

#[test]
fn rebinding_a_glyph_moves_it_between_groups() {
    let dir = tempfile::tempdir().unwrap();
    let ufo_path = write_ufo(dir.path(), "Test-Regular.ufo", "Regular", -20.0);
    set_groups(&ufo_path, &[("public.kern1.A", &["Adieresis", "A", "Aacute"])]);

    let mut sources = SourceSet::load(&ufo_path).unwrap();
    let mut font = sources.font();
    font.get_glyph_mut("Aacute").unwrap().left_kerning_group = Some("Aacute".into());
    sources.apply(&font).unwrap();
    sources.save().unwrap();

    let ufo = norad::Font::load(&ufo_path).unwrap();
    assert_eq!(
        ufo.groups.get(&name("public.kern1.A")),
        Some(&vec![name("Adieresis"), name("A")])
    );
    assert_eq!(
        ufo.groups.get(&name("public.kern1.Aacute")),
        Some(&vec![name("Aacute")])
    );
}

fn stored_timer(path: &Path, glyph: &str) -> Option<f64> {
    let ufo = norad::Font::load(path).unwrap();
    let glyph = ufo.default_layer().get_glyph(glyph).unwrap();
    glyph.lib.get("timer").and_then(|v| v.as_real())
}

#[test]
fn glyph_timers_carry_over_between_rounds() {
    let dir = tempfile::tempdir().unwrap();
    let ufo_path = write_ufo(dir.path(), "Test-Regular.ufo", "Regular", -20.0);
    let t0 = Instant::now();

    let mut sources = SourceSet::load(&ufo_path).unwrap();
    let mut font = sources.font();
    let mut timer = GlyphTimer::new(Some("A"), t0);
    timer.load_totals(&font);
    timer.select("o", t0 + Duration::from_secs(42));
    timer.finish(t0 + Duration::from_secs(44));
    timer.store_totals(&mut font);
    sources.apply(&font).unwrap();
    sources.save().unwrap();
    assert_eq!(stored_timer(&ufo_path, "A"), Some(42.0));
    assert_eq!(stored_timer(&ufo_path, "o"), Some(2.0));
    assert_eq!(stored_timer(&ufo_path, "T"), None);

    // The next session continues from the stored totals.
    let mut sources = SourceSet::load(&ufo_path).unwrap();
    let mut font = sources.font();
    assert_eq!(font.get_glyph("A").unwrap().timer, Some(42.0));
    let mut timer = GlyphTimer::new(Some("A"), t0);
    timer.load_totals(&font);
    timer.finish(t0 + Duration::from_secs(8));
    timer.store_totals(&mut font);
    sources.apply(&font).unwrap();
    sources.save().unwrap();
    assert_eq!(stored_timer(&ufo_path, "A"), Some(50.0));
    assert_eq!(stored_timer(&ufo_path, "o"), Some(2.0));

    // A new round clears every stored timer.
    let mut sources = SourceSet::load(&ufo_path).unwrap();
    let mut font = sources.font();
    let mut timer = GlyphTimer::new(None, t0);
    timer.load_totals(&font);
    timer.reset(t0);
    timer.store_totals(&mut font);
    sources.apply(&font).unwrap();
    sources.save().unwrap();
    assert_eq!(stored_timer(&ufo_path, "A"), None);
    assert_eq!(stored_timer(&ufo_path, "o"), None);
}

#[test]
fn unsupported_source_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Test.glyphs");
    fs::write(&path, "{}").unwrap();

    assert!(matches!(
        SourceSet::load(&path),
        Err(KerningError::UnsupportedSource(_))
    ));
}
