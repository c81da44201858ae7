use std::{borrow::Cow, cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str, text};
use quick_xml::escape::{resolve_html5_entity, unescape_with};

use crate::domain::regions::SectionMarker;

use super::{IndexError, RawHeading};

const ALL_HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const TRACKED_HEADINGS: &str = "h2, h3, h4";
/// Longest HTML5 named reference, `&CounterClockwiseContourIntegral;`, plus slack.
const MAX_REFERENCE_LEN: usize = 40;

pub(super) fn collect_headings(html: &str) -> Result<Vec<RawHeading>, IndexError> {
    let headings = Rc::new(RefCell::new(Vec::<RawHeading>::new()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(ALL_HEADINGS, {
                    let headings = Rc::clone(&headings);
                    move |el| {
                        let level = tag_level(&el.tag_name());
                        headings.borrow_mut().push(RawHeading {
                            level,
                            text: String::new(),
                        });
                        Ok(())
                    }
                }),
                text!(ALL_HEADINGS, {
                    let headings = Rc::clone(&headings);
                    move |chunk| {
                        if let Some(current) = headings.borrow_mut().last_mut() {
                            current.text.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| IndexError::Document {
        message: err.to_string(),
    })?;

    let mut headings = Rc::try_unwrap(headings)
        .map(RefCell::into_inner)
        .unwrap_or_else(|rc| rc.borrow().clone());

    // Text chunks arrive raw and may split a reference, so decode per heading.
    for heading in &mut headings {
        if heading.text.contains('&') {
            heading.text = decode_entities(&heading.text).into_owned();
        }
    }

    Ok(headings)
}

/// Write each marker's identifier into the `id` attribute of its heading.
///
/// `markers` must be the output of indexing the same HTML; any drift in heading
/// count or level is reported instead of producing mismatched anchors.
pub fn apply_heading_ids(html: &str, markers: &[SectionMarker]) -> Result<String, IndexError> {
    let markers = Rc::new(markers.to_vec());
    let index = Rc::new(RefCell::new(0usize));
    let error_slot = Rc::new(RefCell::new(None));

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!(TRACKED_HEADINGS, {
                let markers = Rc::clone(&markers);
                let index = Rc::clone(&index);
                let error_slot = Rc::clone(&error_slot);
                move |el| {
                    let mut idx = index.borrow_mut();
                    let Some(marker) = markers.get(*idx) else {
                        *error_slot.borrow_mut() = Some(IndexError::Document {
                            message: "document has more headings than markers".to_string(),
                        });
                        return Ok(());
                    };
                    *idx += 1;

                    let tag_name = el.tag_name();
                    if tag_level(&tag_name) != marker.level.get() {
                        *error_slot.borrow_mut() = Some(IndexError::Document {
                            message: format!(
                                "heading level mismatch: expected h{}, found {}",
                                marker.level.get(),
                                tag_name
                            ),
                        });
                        return Ok(());
                    }

                    el.set_attribute("id", marker.id.as_str())?;
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| IndexError::Document {
        message: err.to_string(),
    })?;

    if let Some(err) = error_slot.borrow_mut().take() {
        return Err(err);
    }

    if *index.borrow() != markers.len() {
        return Err(IndexError::Document {
            message: format!(
                "document has {} headings but {} markers were supplied",
                index.borrow(),
                markers.len()
            ),
        });
    }

    Ok(rewritten)
}

fn tag_level(tag_name: &str) -> u8 {
    tag_name
        .strip_prefix('h')
        .and_then(|value| value.parse::<u8>().ok())
        .unwrap_or(0)
}

/// Resolve named and numeric character references. References that do not
/// resolve stay as literal text, the way browsers treat a stray `&`.
fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let resolved = candidate
            .find(';')
            .filter(|end| *end <= MAX_REFERENCE_LEN)
            .and_then(|end| {
                unescape_with(&candidate[..=end], resolve_html5_entity)
                    .ok()
                    .map(|value| (value, end))
            });

        match resolved {
            Some((value, end)) => {
                decoded.push_str(&value);
                rest = &candidate[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = &candidate[1..];
            }
        }
    }
    decoded.push_str(rest);

    Cow::Owned(decoded)
}
