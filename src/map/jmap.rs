//! `.jmap` interop
//!
//! A `|`-separated header of `key:value` fields. Numbers are base 32 with the
//! digits `0-9a-v`. The save position is stored as the 13-digit base-32 form
//! of its f64 bit pattern. Objects are a run of three-character groups:
//! `-YY` starts a row, `TXX` places kind `T` at column `XX`, both
//! coordinates offset by 128.

use std::fs;
use std::path::Path;
use super::{MapData, MapError};
use crate::world::{DeathBorder, ObjectKind, Placement, SaveType};

const DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
const VERSION: &str = "1.3.0";
const OFFSET: i64 = 128;

fn bad(field: &str, value: &str) -> MapError {
    MapError::BadField { field: field.to_string(), value: value.to_string() }
}

fn decode(field: &str, digits: &str) -> Result<u64, MapError> {
    if digits.is_empty() {
        return Err(bad(field, digits));
    }
    digits.bytes().try_fold(0u64, |acc, c| {
        let d = DIGITS.iter().position(|&x| x == c).ok_or_else(|| bad(field, digits))?;
        acc.checked_mul(32)
            .and_then(|v| v.checked_add(d as u64))
            .ok_or_else(|| bad(field, digits))
    })
}

fn encode(mut value: u64, width: usize) -> String {
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 32) as usize]);
        value /= 32;
    }
    while out.len() < width {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn parse_int(field: &str, value: &str) -> Result<i32, MapError> {
    value.trim().parse().map_err(|_| bad(field, value))
}

fn parse_objects(value: &str) -> Result<Vec<Placement>, MapError> {
    if !value.is_ascii() || value.len() % 3 != 0 {
        return Err(bad("objects", value));
    }

    let mut placements = Vec::new();
    let mut y = 0i64;
    for group in value.as_bytes().chunks(3) {
        // ASCII checked above, so every chunk is valid UTF-8
        let group = std::str::from_utf8(group).map_err(|_| bad("objects", value))?;
        if let Some(row) = group.strip_prefix('-') {
            y = decode("objects", row)? as i64 - OFFSET;
        } else {
            let id = decode("objects", &group[..1])?;
            let x = decode("objects", &group[1..])? as i64 - OFFSET;
            let kind = u8::try_from(id)
                .ok()
                .and_then(ObjectKind::from_jmap_id)
                .ok_or(MapError::UnknownObject(id as u32))?;
            placements.push(Placement::new(x as f32, y as f32, kind));
        }
    }
    Ok(placements)
}

/// Parse the contents of a `.jmap` file
pub fn parse(s: &str) -> Result<MapData, MapError> {
    let mut map = MapData::default();

    for chunk in s.trim().split('|') {
        let Some((key, value)) = chunk.split_once(':') else {
            continue;
        };
        let flags = &mut map.flags;
        match key {
            "inf" => flags.infjump = parse_int(key, value)? == 1,
            "dot" => flags.dotkid = parse_int(key, value)? == 1,
            "sav" => {
                flags.save_type = match parse_int(key, value)? {
                    0 => SaveType::OnlyShoot,
                    1 => SaveType::ShootOrBullet,
                    _ => return Err(bad(key, value)),
                }
            }
            "bor" => {
                flags.death_border = match parse_int(key, value)? {
                    0 => DeathBorder::Killer,
                    1 => DeathBorder::Solid,
                    _ => return Err(bad(key, value)),
                }
            }
            "px" => flags.save.x = f64::from_bits(decode(key, value)?) as f32,
            "py" => flags.save.y = f64::from_bits(decode(key, value)?) as f32,
            "ps" => flags.save.face = parse_int(key, value)? as f32,
            "pg" => flags.save.grav = parse_int(key, value)? as f32,
            "objects" => map.placements = parse_objects(value)?,
            other => log::debug!("Ignoring jmap field {}", other),
        }
    }

    Ok(map)
}

/// Render a map as `.jmap` text. Only kinds with a jmap id are written.
pub fn write(map: &MapData) -> Result<String, MapError> {
    let mut cells: Vec<(i64, i64, u8)> = Vec::new();
    for p in &map.placements {
        let Some(id) = p.kind.jmap_id() else {
            log::warn!("{:?} has no jmap id, skipped", p.kind);
            continue;
        };
        let x = p.x as i64 + OFFSET;
        let y = p.y as i64 + OFFSET;
        if !(0..1024).contains(&x) || !(0..1024).contains(&y) {
            return Err(MapError::OutOfRange { x: p.x, y: p.y });
        }
        cells.push((x, y, id));
    }
    cells.sort_by_key(|&(_, y, _)| y);

    let mut objects = String::new();
    let mut row = None;
    for (x, y, id) in cells {
        if row != Some(y) {
            row = Some(y);
            objects.push('-');
            objects.push_str(&encode(y as u64, 2));
        }
        objects.push_str(&encode(id as u64, 1));
        objects.push_str(&encode(x as u64, 2));
    }

    let f = &map.flags;
    Ok(format!(
        "jtool|{}|inf:{}|dot:{}|sav:{}|bor:{}|px:{}|py:{}|ps:{}|pg:{}|objects:{}",
        VERSION,
        f.infjump as i32,
        f.dotkid as i32,
        match f.save_type {
            SaveType::OnlyShoot => 0,
            SaveType::ShootOrBullet => 1,
        },
        match f.death_border {
            DeathBorder::Killer => 0,
            DeathBorder::Solid => 1,
        },
        encode((f.save.x as f64).to_bits(), 13),
        encode((f.save.y as f64).to_bits(), 13),
        f.save.face as i32,
        f.save.grav as i32,
        objects,
    ))
}

pub fn load_jmap<P: AsRef<Path>>(path: P) -> Result<MapData, MapError> {
    let contents = fs::read_to_string(path)?;
    parse(&contents)
}

pub fn save_jmap<P: AsRef<Path>>(map: &MapData, path: P) -> Result<(), MapError> {
    fs::write(path, write(map)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MapFlags, PlayerSave};

    const SAMPLE: &str = "jtool|1.3.0|inf:1|dot:0|sav:1|bor:0|px:40u8g00000000|py:40ubg00000000|ps:-1|pg:1|objects:-g0kg0-h01f01g01h0";

    #[test]
    fn test_parse_sample() {
        let map = parse(SAMPLE).unwrap();
        assert!(map.flags.infjump);
        assert!(!map.flags.dotkid);
        assert_eq!(map.flags.save_type, SaveType::ShootOrBullet);
        assert_eq!(map.flags.death_border, DeathBorder::Killer);
        assert_eq!(map.flags.save, PlayerSave { x: 401.0, y: 407.0, face: -1.0, grav: 1.0 });
        assert_eq!(
            map.placements,
            vec![
                Placement::new(384.0, 384.0, ObjectKind::PlayerStart),
                Placement::new(352.0, 416.0, ObjectKind::Block),
                Placement::new(384.0, 416.0, ObjectKind::Block),
                Placement::new(416.0, 416.0, ObjectKind::Block),
            ]
        );
    }

    #[test]
    fn test_write_matches_sample() {
        let map = parse(SAMPLE).unwrap();
        assert_eq!(write(&map).unwrap(), SAMPLE);
    }

    #[test]
    fn test_negative_coordinates_use_offset() {
        let map = MapData {
            flags: MapFlags::default(),
            placements: vec![Placement::new(-32.0, -16.0, ObjectKind::MiniBlock)],
        };
        let text = write(&map).unwrap();
        // -16 + 128 = 112 = "3g", -32 + 128 = 96 = "30"
        assert!(text.ends_with("objects:-3g230"));
        assert_eq!(parse(&text).unwrap().placements, map.placements);
    }

    #[test]
    fn test_unknown_object_id() {
        let text = "jtool|1.3.0|objects:-40v00";
        assert!(matches!(parse(text), Err(MapError::UnknownObject(31))));
    }

    #[test]
    fn test_malformed_fields() {
        assert!(matches!(parse("jtool|inf:yes"), Err(MapError::BadField { .. })));
        assert!(matches!(parse("jtool|px:zz"), Err(MapError::BadField { .. })));
        assert!(matches!(parse("jtool|objects:-4"), Err(MapError::BadField { .. })));
    }

    #[test]
    fn test_out_of_range_position() {
        let map = MapData {
            flags: MapFlags::default(),
            placements: vec![Placement::new(2000.0, 0.0, ObjectKind::Block)],
        };
        assert!(matches!(write(&map), Err(MapError::OutOfRange { .. })));
    }
}
