//! Minimal HID report descriptor walker.
//!
//! Only used where the host does not report collection usages directly
//! (Linux hidraw exposes the raw descriptor instead).

const LONG_ITEM: u8 = 0xFE;
const TAG_MASK: u8 = 0xFC;
const SIZE_MASK: u8 = 0x03;

const USAGE_PAGE: u8 = 0x04;
const USAGE: u8 = 0x08;
const COLLECTION: u8 = 0xA0;

/// Usage page and usage of the first top-level collection.
///
/// Returns `None` for a truncated descriptor or one without a collection.
pub fn top_level_usage(descriptor: &[u8]) -> Option<(u16, u16)> {
    let mut usage_page = None;
    let mut usage: Option<(Option<u16>, u16)> = None;

    let mut pos = 0;
    while pos < descriptor.len() {
        let prefix = descriptor[pos];
        if prefix == LONG_ITEM {
            let size = usize::from(*descriptor.get(pos + 1)?);
            pos += 3 + size;
            continue;
        }

        let size = match prefix & SIZE_MASK {
            3 => 4,
            n => usize::from(n),
        };
        let data = descriptor.get(pos + 1..pos + 1 + size)?;
        let value = data
            .iter()
            .rev()
            .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));

        match prefix & TAG_MASK {
            USAGE_PAGE => usage_page = Some(value as u16),
            // A 4-byte usage is extended: the high half names its own page.
            USAGE if size == 4 => usage = Some((Some((value >> 16) as u16), value as u16)),
            USAGE => usage = Some((None, value as u16)),
            COLLECTION => {
                let (page, usage) = usage?;
                return Some((page.or(usage_page)?, usage));
            }
            _ => {}
        }

        pos += 1 + size;
    }

    None
}
