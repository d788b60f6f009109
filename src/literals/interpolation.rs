//! Interpolation regions inside string content.
//!
//! `${expr}` in template strings and `{expr}` in f-strings must survive truncation
//! whole: a cut that lands inside one is pushed forward to its closing bracket.

use std::ops::Range;

use super::error::LiteralError;
use super::profile::InterpolationMarker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolationRegion {
    pub span: Range<usize>,
    /// False when the content ended before the closing bracket.
    pub closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InterpolationMap {
    regions: Vec<InterpolationRegion>,
}

impl InterpolationMap {
    pub fn regions(&self) -> &[InterpolationRegion] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Move `cut` past the region it falls strictly inside, if any.
    pub fn adjust_cut(&self, cut: usize, max_extension: usize) -> Result<usize, LiteralError> {
        let Some(region) = self
            .regions
            .iter()
            .find(|r| r.span.start < cut && cut < r.span.end)
        else {
            return Ok(cut);
        };

        if !region.closed || region.span.end - cut > max_extension {
            return Err(LiteralError::InterpolationBoundaryUnresolvable {
                offset: region.span.start,
                limit: max_extension,
            });
        }
        Ok(region.span.end)
    }
}

pub struct InterpolationAnalyzer;

impl InterpolationAnalyzer {
    /// Markers that apply to a string opened with `opening` (prefix letters plus quote).
    pub fn active_markers<'m>(opening: &str, markers: &'m [InterpolationMarker]) -> Vec<&'m InterpolationMarker> {
        let prefix: String = opening.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
        let quote = &opening[prefix.len()..];
        markers
            .iter()
            .filter(|m| m.required_prefix.map_or(true, |letters| prefix.chars().any(|c| letters.contains(c))))
            .filter(|m| m.only_quote.map_or(true, |q| quote.starts_with(q)))
            .collect()
    }

    /// Record every interpolation region of `content` in one pass.
    pub fn analyze(content: &str, opening: &str, markers: &[InterpolationMarker]) -> InterpolationMap {
        let active = Self::active_markers(opening, markers);
        if active.is_empty() {
            return InterpolationMap::default();
        }

        let bytes = content.as_bytes();
        let mut regions = Vec::new();
        let mut i = 0;
        'scan: while i < bytes.len() {
            if bytes[i] == b'\\' {
                i += 2;
                continue;
            }

            for marker in &active {
                let open = marker.open as u8;
                let close = marker.close as u8;

                if marker.doubled_escape && i + 1 < bytes.len() {
                    let pair = (bytes[i], bytes[i + 1]);
                    if pair == (open, open) || pair == (close, close) {
                        // `{{` is a literal brace; keep the pair together
                        regions.push(InterpolationRegion {
                            span: i..i + 2,
                            closed: true,
                        });
                        i += 2;
                        continue 'scan;
                    }
                }

                let start_len = marker.prefix.len() + 1;
                if !bytes[i..].starts_with(marker.prefix.as_bytes())
                    || bytes.get(i + marker.prefix.len()) != Some(&open)
                {
                    continue;
                }

                let (end, closed) = Self::region_end(bytes, i + start_len, open, close);
                regions.push(InterpolationRegion { span: i..end, closed });
                i = end;
                continue 'scan;
            }
            i += 1;
        }

        InterpolationMap { regions }
    }

    fn region_end(bytes: &[u8], from: usize, open: u8, close: u8) -> (usize, bool) {
        let mut depth = 1usize;
        let mut j = from;
        while j < bytes.len() {
            match bytes[j] {
                b'\\' => {
                    j += 2;
                    continue;
                }
                b if b == open => depth += 1,
                b if b == close => {
                    depth -= 1;
                    if depth == 0 {
                        return (j + 1, true);
                    }
                }
                _ => {}
            }
            j += 1;
        }
        (bytes.len(), false)
    }
}
