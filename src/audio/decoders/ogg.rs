//! Ogg page parsing over in-memory bytes.
//!
//! Pages are parsed straight out of the compressed buffer; a page that is not
//! completely buffered yet is reported as incomplete rather than as an error.

use crate::error::DecodeError;

const CAPTURE_PATTERN: &[u8; 4] = b"OggS";
const HEADER_LEN: usize = 27;

const FLAG_CONTINUED: u8 = 0x01;
const FLAG_FIRST: u8 = 0x02;
const FLAG_LAST: u8 = 0x04;

/// One complete Ogg page borrowed from the input
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    header_type: u8,
    granule_position: u64,
    serial: u32,
    sequence: u32,
    segments: &'a [u8],
    body: &'a [u8],
    len: usize,
}

impl<'a> Page<'a> {
    /// Total encoded size of the page in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_continued(&self) -> bool {
        self.header_type & FLAG_CONTINUED != 0
    }

    pub fn is_first(&self) -> bool {
        self.header_type & FLAG_FIRST != 0
    }

    pub fn is_last(&self) -> bool {
        self.header_type & FLAG_LAST != 0
    }

    pub fn granule_position(&self) -> u64 {
        self.granule_position
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn body(&self) -> &'a [u8] {
        self.body
    }
}

/// Parse the page at the start of `data`.
///
/// Returns `Ok(None)` when `data` ends before the page does.
pub fn parse_page(data: &[u8]) -> Result<Option<Page<'_>>, DecodeError> {
    if data.len() < HEADER_LEN {
        if !CAPTURE_PATTERN.starts_with(&data[..data.len().min(4)]) {
            return Err(DecodeError::Container("invalid Ogg capture pattern".to_string()));
        }
        return Ok(None);
    }

    if &data[0..4] != CAPTURE_PATTERN {
        return Err(DecodeError::Container("invalid Ogg capture pattern".to_string()));
    }
    if data[4] != 0 {
        return Err(DecodeError::Container(format!("unsupported Ogg version {}", data[4])));
    }

    let segment_count = data[26] as usize;
    let table_end = HEADER_LEN + segment_count;
    if data.len() < table_end {
        return Ok(None);
    }

    let segments = &data[HEADER_LEN..table_end];
    let body_len: usize = segments.iter().map(|&s| s as usize).sum();
    let page_len = table_end + body_len;
    if data.len() < page_len {
        return Ok(None);
    }

    let expected_crc = u32::from_le_bytes([data[22], data[23], data[24], data[25]]);
    let actual_crc = crc::page_checksum(&data[..page_len]);
    if actual_crc != expected_crc {
        return Err(DecodeError::Container(format!(
            "CRC32 mismatch: expected 0x{:08x}, got 0x{:08x}",
            expected_crc, actual_crc
        )));
    }

    let mut granule = [0u8; 8];
    granule.copy_from_slice(&data[6..14]);

    Ok(Some(Page {
        header_type: data[5],
        granule_position: u64::from_le_bytes(granule),
        serial: u32::from_le_bytes([data[14], data[15], data[16], data[17]]),
        sequence: u32::from_le_bytes([data[18], data[19], data[20], data[21]]),
        segments,
        body: &data[table_end..page_len],
        len: page_len,
    }))
}

/// Joins lacing segments into packets across page boundaries
#[derive(Debug, Default)]
pub struct PacketAssembler {
    partial: Vec<u8>,
    serial: Option<u32>,
    finished: bool,
}

impl PacketAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a packet is still waiting for its continuation page
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty()
    }

    /// Whether the end-of-stream page has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Append every packet completed by `page` to `out`
    pub fn push_page(&mut self, page: &Page<'_>, out: &mut Vec<Vec<u8>>) -> Result<(), DecodeError> {
        match self.serial {
            Some(serial) if serial != page.serial => {
                return Err(DecodeError::Container(
                    "multiple logical streams are not supported".to_string(),
                ));
            }
            Some(_) => {}
            None => self.serial = Some(page.serial),
        }

        if page.is_continued() && self.partial.is_empty() {
            return Err(DecodeError::Container(
                "unexpected continuation flag without existing packet".to_string(),
            ));
        }
        if !page.is_continued() && !self.partial.is_empty() {
            return Err(DecodeError::Container(
                "dangling packet without continuation flag".to_string(),
            ));
        }

        let mut offset = 0;
        for &segment in page.segments {
            let end = offset + segment as usize;
            self.partial.extend_from_slice(&page.body[offset..end]);
            offset = end;

            // A lacing value below 255 closes the packet
            if segment < 255 {
                out.push(std::mem::take(&mut self.partial));
            }
        }

        if page.is_last() {
            self.finished = true;
        }
        Ok(())
    }
}

pub(crate) mod crc {
    const fn table_entry(index: u32) -> u32 {
        let mut r = index << 24;
        let mut i = 0;
        while i < 8 {
            r = (r << 1) ^ (-(((r >> 31) & 1) as i32) as u32 & 0x04c11db7);
            i += 1;
        }
        r
    }

    const fn build_table() -> [u32; 256] {
        let mut table = [0u32; 256];
        let mut i = 0;
        while i < 256 {
            table[i] = table_entry(i as u32);
            i += 1;
        }
        table
    }

    static TABLE: [u32; 256] = build_table();

    pub fn update(crc: u32, bytes: &[u8]) -> u32 {
        bytes.iter().fold(crc, |crc, &b| {
            (crc << 8) ^ TABLE[((b as u32) ^ (crc >> 24)) as usize]
        })
    }

    /// CRC of a full page, with the checksum field read as zero
    pub fn page_checksum(page: &[u8]) -> u32 {
        let crc = update(0, &page[..22]);
        let crc = update(crc, &[0; 4]);
        update(crc, &page[26..])
    }
}

/// Serialize one page with a valid checksum
#[cfg(test)]
pub(crate) fn build_page(header_type: u8, serial: u32, sequence: u32, granule: u64, segments: &[u8], body: &[u8]) -> Vec<u8> {
    let mut page = Vec::with_capacity(HEADER_LEN + segments.len() + body.len());
    page.extend_from_slice(CAPTURE_PATTERN);
    page.push(0);
    page.push(header_type);
    page.extend_from_slice(&granule.to_le_bytes());
    page.extend_from_slice(&serial.to_le_bytes());
    page.extend_from_slice(&sequence.to_le_bytes());
    page.extend_from_slice(&[0; 4]);
    page.push(segments.len() as u8);
    page.extend_from_slice(segments);
    page.extend_from_slice(body);

    let crc = crc::page_checksum(&page);
    page[22..26].copy_from_slice(&crc.to_le_bytes());
    page
}

/// Lacing values for a list of packets that all end on this page
#[cfg(test)]
pub(crate) fn lace(packets: &[&[u8]]) -> (Vec<u8>, Vec<u8>) {
    let mut segments = Vec::new();
    let mut body = Vec::new();
    for packet in packets {
        let mut remaining = packet.len();
        while remaining >= 255 {
            segments.push(255);
            remaining -= 255;
        }
        segments.push(remaining as u8);
        body.extend_from_slice(packet);
    }
    (segments, body)
}
