// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming parser for the `Home.xml` scene document.
//!
//! The document is a single `<home>` root with a flat stream of child
//! elements. All data lives in attributes; elements carry at most one
//! level of geometric children (`<point>`, `<baseboard>`, `<lightSource>`)
//! except `<furnitureGroup>`, which nests furniture recursively. Unknown
//! tags and attributes are skipped so newer documents still load.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::model::{ElementKind, Home, RawChild, RawElement};

/// Parse a complete scene document.
pub fn parse_home(xml: &str) -> Result<Home> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(start) if start.name().as_ref() == b"home" => {
                return parse_home_body(&mut reader, &start);
            }
            Event::Empty(start) if start.name().as_ref() == b"home" => {
                let mut home = Home::default();
                apply_root_attributes(&start, &mut home)?;
                return Ok(home);
            }
            Event::Start(start) => {
                return Err(Error::UnexpectedStructure(format!(
                    "expected <home> root, found <{}>",
                    String::from_utf8_lossy(start.name().as_ref())
                )));
            }
            Event::Eof => {
                return Err(Error::UnexpectedStructure(
                    "document has no <home> root".to_string(),
                ));
            }
            // Declaration, comments, whitespace before the root.
            _ => {}
        }
    }
}

fn apply_root_attributes(root: &BytesStart<'_>, home: &mut Home) -> Result<()> {
    for (key, value) in attributes_of(root)? {
        match key.as_str() {
            "name" => home.name = Some(value),
            "version" => home.version = Some(value),
            "wallHeight" => {
                home.wall_height = Some(value.parse().map_err(|_| Error::InvalidAttribute {
                    tag: "home",
                    attr: "wallHeight",
                    value,
                })?)
            }
            _ => {}
        }
    }
    Ok(())
}

fn parse_home_body(reader: &mut Reader<&[u8]>, root: &BytesStart<'_>) -> Result<Home> {
    let mut home = Home::default();
    apply_root_attributes(root, &mut home)?;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = start.name();
                if let Some(kind) = kind_of(&name) {
                    home.elements
                        .push(parse_element(reader, &start, kind, true)?);
                } else if name.as_ref() == b"property" {
                    push_property(&start, &mut home.properties)?;
                    reader.read_to_end(name)?;
                } else {
                    // environment, compass, print, labels and friends.
                    reader.read_to_end(name)?;
                }
            }
            Event::Empty(start) => {
                let name = start.name();
                if let Some(kind) = kind_of(&name) {
                    home.elements
                        .push(parse_element(reader, &start, kind, false)?);
                } else if name.as_ref() == b"property" {
                    push_property(&start, &mut home.properties)?;
                }
            }
            Event::End(_) => return Ok(home),
            Event::Eof => {
                return Err(Error::UnexpectedStructure(
                    "unterminated <home> element".to_string(),
                ))
            }
            _ => {}
        }
    }
}

fn kind_of(name: &quick_xml::name::QName<'_>) -> Option<ElementKind> {
    std::str::from_utf8(name.as_ref())
        .ok()
        .and_then(ElementKind::from_tag)
}

fn attributes_of(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        out.push((key, value));
    }
    Ok(out)
}

fn attribute_map(start: &BytesStart<'_>) -> Result<FxHashMap<String, String>> {
    Ok(attributes_of(start)?.into_iter().collect())
}

fn push_property(start: &BytesStart<'_>, out: &mut Vec<(String, String)>) -> Result<()> {
    let map = attribute_map(start)?;
    if let (Some(name), Some(value)) = (map.get("name"), map.get("value")) {
        out.push((name.clone(), value.clone()));
    }
    Ok(())
}

/// Parse one element of the stream, including its geometric children.
/// `has_children` distinguishes `<wall .../>` from `<wall ...>...</wall>`.
fn parse_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    kind: ElementKind,
    has_children: bool,
) -> Result<RawElement> {
    let mut element = RawElement::new(kind);
    element.attrs = attribute_map(start)?;

    if !has_children {
        return Ok(element);
    }

    loop {
        match reader.read_event()? {
            Event::Start(child) => {
                let name = child.name();
                if let Some(parsed) = parse_child(reader, &child, kind, true)? {
                    element.children.push(parsed);
                } else {
                    reader.read_to_end(name)?;
                }
            }
            Event::Empty(child) => {
                if let Some(parsed) = parse_child(reader, &child, kind, false)? {
                    element.children.push(parsed);
                }
            }
            Event::End(_) => return Ok(element),
            Event::Eof => {
                return Err(Error::UnexpectedStructure(format!(
                    "unterminated <{}> element",
                    kind.tag()
                )))
            }
            _ => {}
        }
    }
}

fn parse_child(
    reader: &mut Reader<&[u8]>,
    child: &BytesStart<'_>,
    parent: ElementKind,
    has_children: bool,
) -> Result<Option<RawChild>> {
    match child.name().as_ref() {
        b"point" => {
            let map = attribute_map(child)?;
            let x = child_coord(&map, "x")?;
            let y = child_coord(&map, "y")?;
            if has_children {
                reader.read_to_end(child.name())?;
            }
            Ok(Some(RawChild::Point { x, y }))
        }
        b"baseboard" => {
            let map = attribute_map(child)?;
            if has_children {
                reader.read_to_end(child.name())?;
            }
            Ok(Some(RawChild::Baseboard(map)))
        }
        b"lightSource" => {
            let map = attribute_map(child)?;
            if has_children {
                reader.read_to_end(child.name())?;
            }
            Ok(Some(RawChild::LightSource(map)))
        }
        // Groups nest furniture, openings, lights and further groups.
        name if parent == ElementKind::FurnitureGroup => {
            match std::str::from_utf8(name).ok().and_then(ElementKind::from_tag) {
                Some(kind) => {
                    let nested = parse_element(reader, child, kind, has_children)?;
                    Ok(Some(RawChild::Furniture(Box::new(nested))))
                }
                None => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

fn child_coord(map: &FxHashMap<String, String>, attr: &'static str) -> Result<f64> {
    let value = map
        .get(attr)
        .ok_or(Error::MissingAttribute { tag: "point", attr })?;
    value.parse().map_err(|_| Error::InvalidAttribute {
        tag: "point",
        attr,
        value: value.to_string(),
    })
}
