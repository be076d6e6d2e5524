//! Load a font from UFO sources and write edits back to them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use norad::designspace;
use rayon::prelude::*;

use crate::error::KerningError;
use crate::font::{Font, FontMaster, Glyph, Layer};
use crate::key::{KerningKey, Side};
use crate::kerning::KerningTable;
use crate::norad_interop::{glyph_category, glyph_timer, set_glyph_timer};

const GLYPH_ORDER_KEY: &str = "public.glyphOrder";

/// One UFO standing in for one master.
#[derive(Debug)]
struct UfoSource {
    master: FontMaster,
    path: PathBuf,
    ufo: norad::Font,
}

/// The UFOs behind a [`Font`]: either a single UFO or the full (non-sparse)
/// sources of a Designspace, each one master.
#[derive(Debug)]
pub struct SourceSet {
    sources: Vec<UfoSource>,
}

impl SourceSet {
    pub fn load(path: &Path) -> Result<Self, KerningError> {
        let ufo_paths: Vec<(String, PathBuf)> =
            match path.extension().and_then(|e| e.to_str()) {
                Some("designspace") => designspace_sources(path)?,
                Some("ufo") => vec![(String::new(), path.to_path_buf())],
                _ => return Err(KerningError::UnsupportedSource(path.to_path_buf())),
            };

        let sources = ufo_paths
            .into_par_iter()
            .map(|(name, path)| {
                let ufo = norad::Font::load(&path).map_err(|source| KerningError::Load {
                    path: path.clone(),
                    source,
                })?;
                let name = if name.is_empty() {
                    ufo.font_info
                        .style_name
                        .clone()
                        .unwrap_or_else(|| String::from("Regular"))
                } else {
                    name
                };
                info!("Loaded {} as master {}", path.display(), name);
                Ok(UfoSource {
                    master: FontMaster {
                        id: uuid::Uuid::new_v4().to_string().to_uppercase(),
                        name,
                    },
                    path,
                    ufo,
                })
            })
            .collect::<Result<Vec<_>, KerningError>>()?;

        Ok(Self { sources })
    }

    /// Build the font model from the UFOs.
    pub fn font(&self) -> Font {
        let mut font = Font::default();
        for source in &self.sources {
            font.font_master.push(source.master.clone());
        }

        let mut glyphs: HashMap<String, Glyph> = HashMap::new();
        let mut glyph_order: Option<Vec<String>> = None;

        for source in &self.sources {
            let ufo = &source.ufo;
            let master_id = &source.master.id;

            if let (None, Some(Some(source_glyph_order))) = (
                &glyph_order,
                ufo.lib.get(GLYPH_ORDER_KEY).map(|v| v.as_array()),
            ) {
                glyph_order.replace(
                    source_glyph_order
                        .iter()
                        .filter_map(|v| v.as_string())
                        .map(str::to_string)
                        .collect(),
                );
            }

            let kern_groups = kern_group_bindings(ufo);
            for ufo_glyph in ufo.default_layer().iter() {
                let name = ufo_glyph.name().to_string();
                let glyph = glyphs
                    .entry(name.clone())
                    .or_insert_with(|| Glyph::new(name.clone()));
                if glyph.category.is_none() {
                    glyph.category = glyph_category(ufo, ufo_glyph);
                }
                if glyph.timer.is_none() {
                    glyph.timer = glyph_timer(ufo_glyph);
                }
                if let Some((left, right)) = kern_groups.get(name.as_str()) {
                    if glyph.left_kerning_group.is_none() {
                        glyph.left_kerning_group = left.clone();
                    }
                    if glyph.right_kerning_group.is_none() {
                        glyph.right_kerning_group = right.clone();
                    }
                }
                glyph.layers.push(Layer::from_norad(ufo_glyph, master_id));
            }

            let table: KerningTable = ufo
                .kerning
                .iter()
                .flat_map(|(left, row)| {
                    row.iter().map(move |(right, value)| {
                        (
                            KerningKey::from_ufo_name(left.as_str()),
                            KerningKey::from_ufo_name(right.as_str()),
                            *value,
                        )
                    })
                })
                .collect();
            debug!("{} kerning pairs in {}", table.len(), source.master.name);
            font.kerning.insert(master_id.clone(), table);
        }

        // Glyphs are sorted like the glyphOrder, leftovers alphabetically.
        let mut glyph_order = glyph_order.unwrap_or_default();
        let ordered: HashSet<&String> = glyph_order.iter().collect();
        let mut leftovers: Vec<String> = glyphs
            .keys()
            .filter(|name| !ordered.contains(name))
            .cloned()
            .collect();
        leftovers.sort();
        glyph_order.extend(leftovers);
        for name in glyph_order {
            if let Some(glyph) = glyphs.remove(&name) {
                font.glyphs.push(glyph);
            }
        }

        font
    }

    /// Write kerning, kerning groups and changed glyph layers of `font` into
    /// the UFOs. Nothing is saved to disk until [`SourceSet::save`].
    pub fn apply(&mut self, font: &Font) -> Result<(), KerningError> {
        self.sources
            .par_iter_mut()
            .try_for_each(|source| source.apply(font))
    }

    /// Save every UFO in place.
    pub fn save(&mut self) -> Result<(), KerningError> {
        self.sources.par_iter_mut().try_for_each(|source| {
            // Save the UFO, but preserve the metainfo.plist, because it's
            // uninteresting and changing it increases git noise.
            let metainfo_path = source.path.join("metainfo.plist");
            let metainfo = fs::read(&metainfo_path).ok();
            source
                .ufo
                .save(&source.path)
                .map_err(|e| KerningError::Save {
                    path: source.path.clone(),
                    source: e,
                })?;
            if let Some(metainfo) = metainfo {
                fs::write(metainfo_path, metainfo)?;
            }
            info!("Saved {}", source.path.display());
            Ok(())
        })
    }
}

impl UfoSource {
    fn apply(&mut self, font: &Font) -> Result<(), KerningError> {
        let master = self.master.clone();

        let mut kerning: BTreeMap<norad::Name, BTreeMap<norad::Name, f64>> = BTreeMap::new();
        let mut referenced_groups: HashSet<KerningKey> = HashSet::new();
        if let Some(table) = font.kerning_for(&master.id) {
            for (left, right, value) in table.iter() {
                let (Some(left_name), Some(right_name)) =
                    (ufo_key_name(font, left), ufo_key_name(font, right))
                else {
                    warn!(
                        "Dropping pair {} {} in {}: key refers to no glyph",
                        left, right, master.name
                    );
                    continue;
                };
                kerning
                    .entry(norad::Name::new(&left_name)?)
                    .or_default()
                    .insert(norad::Name::new(&right_name)?, value);
                for key in [left, right] {
                    if key.is_group() {
                        referenced_groups.insert(key.clone());
                    }
                }
            }
        }

        self.ufo.kerning = kerning;
        self.merge_kern_groups(font, referenced_groups)?;

        let ufo_layer = self.ufo.default_layer_mut();
        let mut changed = 0;
        for glyph in &font.glyphs {
            let Some(ufo_glyph) = ufo_layer.get_glyph_mut(glyph.name()) else {
                continue;
            };
            let mut glyph_changed = set_glyph_timer(ufo_glyph, glyph.timer);
            if let Some(layer) = glyph.get_layer(&master.id) {
                if Layer::from_norad(ufo_glyph, &master.id) != *layer {
                    layer.write_to_norad(ufo_glyph)?;
                    glyph_changed = true;
                }
            }
            if glyph_changed {
                changed += 1;
            }
        }
        info!(
            "{}: wrote {} kerning pairs and {} changed glyphs",
            master.name,
            font.kerning_for(&master.id).map_or(0, KerningTable::len),
            changed
        );
        Ok(())
    }

    /// Bring the UFO's kern groups in line with the glyphs' group bindings.
    ///
    /// Existing groups keep their member order. Members the font model
    /// knows nothing about, like glyphs missing from this source, stay where
    /// they are. A member is only removed when its glyph is now bound to a
    /// different group on that side, and newly bound glyphs are appended.
    fn merge_kern_groups(
        &mut self,
        font: &Font,
        referenced_groups: HashSet<KerningKey>,
    ) -> Result<(), KerningError> {
        let ufo_glyphs = self.ufo.default_layer();
        let model_glyphs: HashMap<&str, &Glyph> = font
            .glyphs
            .iter()
            .filter(|g| ufo_glyphs.get_glyph(g.name()).is_some())
            .map(|g| (g.name(), g))
            .collect();
        let binding = |glyph: &Glyph, side: Side| match side {
            Side::Left => glyph.left_kerning_group.clone(),
            Side::Right => glyph.right_kerning_group.clone(),
        };

        let mut groups = self.ufo.groups.clone();
        for (name, members) in groups.iter_mut() {
            let KerningKey::Group(side, group) = KerningKey::from_ufo_name(name.as_str()) else {
                continue;
            };
            members.retain(|member| match model_glyphs.get(member.as_str()) {
                Some(glyph) => binding(*glyph, side).as_deref() == Some(group.as_str()),
                None => true,
            });
        }

        for glyph in &font.glyphs {
            if !model_glyphs.contains_key(glyph.name()) {
                continue;
            }
            for side in [Side::Left, Side::Right] {
                let Some(group) = binding(glyph, side) else {
                    continue;
                };
                let Some(group_name) = KerningKey::group(side, group).to_ufo_name() else {
                    continue;
                };
                let members = groups.entry(norad::Name::new(&group_name)?).or_default();
                let member = norad::Name::new(glyph.name())?;
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }

        for key in referenced_groups {
            if let Some(group_name) = key.to_ufo_name() {
                groups.entry(norad::Name::new(&group_name)?).or_default();
            }
        }

        if groups != self.ufo.groups {
            debug!("{}: kern groups updated", self.master.name);
            self.ufo.groups = groups;
        }
        Ok(())
    }
}

/// The UFO spelling of a key, resolving glyph ids through `font`.
fn ufo_key_name(font: &Font, key: &KerningKey) -> Option<String> {
    match key {
        KerningKey::GlyphId(id) => font
            .glyph_by_id(&id.to_string())
            .map(|g| g.name().to_string()),
        _ => key.to_ufo_name(),
    }
}

/// Glyph name to its (left, right) kerning group names.
fn kern_group_bindings(ufo: &norad::Font) -> HashMap<&str, (Option<String>, Option<String>)> {
    let mut bindings: HashMap<&str, (Option<String>, Option<String>)> = HashMap::new();
    for (name, members) in &ufo.groups {
        let KerningKey::Group(side, group) = KerningKey::from_ufo_name(name.as_str()) else {
            continue;
        };
        for member in members {
            let binding = bindings.entry(member.as_str()).or_default();
            match side {
                Side::Left => binding.0 = Some(group.clone()),
                Side::Right => binding.1 = Some(group.clone()),
            }
        }
    }
    bindings
}

/// (master name, UFO path) for each full source; sparse layer sources are
/// skipped.
fn designspace_sources(designspace_path: &Path) -> Result<Vec<(String, PathBuf)>, KerningError> {
    let designspace = designspace::DesignSpaceDocument::load(designspace_path)?;
    let designspace_dir = designspace_path.parent().unwrap_or_else(|| Path::new(""));

    let mut sources = Vec::new();
    for source in &designspace.sources {
        if let Some(layer) = &source.layer {
            debug!("Skipping sparse source {} (layer {})", source.name, layer);
            continue;
        }
        let name = source
            .stylename
            .clone()
            .unwrap_or_else(|| source.name.clone());
        sources.push((name, designspace_dir.join(&source.filename)));
    }
    Ok(sources)
}
