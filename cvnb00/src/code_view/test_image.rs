//! Synthetic executables with CodeView data appended, for tests.


/// Size of the fake MZ stub in front of the debug data.
const STUB_SIZE: usize = 0x40;


pub(crate) fn encode_module(
    code_base: u16,
    code_offset: u16,
    code_length: u16,
    overlay_number: u16,
    library_index_and_flags: u16,
    segment_count: u8,
    name: &[u8],
) -> Vec<u8> {
    encode_padded_module(code_base, code_offset, code_length, overlay_number, library_index_and_flags, segment_count, 0, name)
}

/// Encodes a module subsection with `padding` bytes between the fixed part and the name.
pub(crate) fn encode_padded_module(
    code_base: u16,
    code_offset: u16,
    code_length: u16,
    overlay_number: u16,
    library_index_and_flags: u16,
    segment_count: u8,
    padding: usize,
    name: &[u8],
) -> Vec<u8> {
    let mut ret = Vec::new();
    ret.extend_from_slice(&code_base.to_le_bytes());
    ret.extend_from_slice(&code_offset.to_le_bytes());
    ret.extend_from_slice(&code_length.to_le_bytes());
    ret.extend_from_slice(&overlay_number.to_le_bytes());
    ret.extend_from_slice(&library_index_and_flags.to_le_bytes());
    ret.push(segment_count);
    ret.push(0x00); // reserved
    ret.push(name.len().try_into().unwrap());
    ret.resize(ret.len() + padding, 0xEE);
    ret.extend_from_slice(name);
    ret
}

pub(crate) fn encode_public(ret: &mut Vec<u8>, offset: u16, segment: u16, type_index: u16, name: &[u8]) {
    ret.extend_from_slice(&offset.to_le_bytes());
    ret.extend_from_slice(&segment.to_le_bytes());
    ret.extend_from_slice(&type_index.to_le_bytes());
    ret.push(name.len().try_into().unwrap());
    ret.extend_from_slice(name);
}

pub(crate) fn encode_publics(symbols: &[(u16, u16, u16, &str)]) -> Vec<u8> {
    let mut ret = Vec::new();
    for (offset, segment, type_index, name) in symbols {
        encode_public(&mut ret, *offset, *segment, *type_index, name.as_bytes());
    }
    ret
}


/// Lays out a stub, the debug data header, the payloads, the directory and the trailer.
#[derive(Clone, Debug)]
pub(crate) struct ImageBuilder {
    signature: [u8; 4],
    subsections: Vec<(u16, u16, Vec<u8>)>,
}
impl ImageBuilder {
    pub fn new() -> Self {
        Self {
            signature: *b"NB00",
            subsections: Vec::new(),
        }
    }

    pub fn signature(mut self, signature: [u8; 4]) -> Self {
        self.signature = signature;
        self
    }

    pub fn subsection(mut self, subsection_type: u16, module_index: u16, payload: Vec<u8>) -> Self {
        self.subsections.push((subsection_type, module_index, payload));
        self
    }

    pub fn base_offset(&self) -> u64 {
        STUB_SIZE.try_into().unwrap()
    }

    pub fn build(&self) -> Vec<u8> {
        let mut image = b"MZ".to_vec();
        image.resize(STUB_SIZE, 0x00);

        let base = image.len();
        image.extend_from_slice(&self.signature);
        image.extend_from_slice(&[0u8; 4]); // directory offset, patched below

        let mut payload_offsets = Vec::with_capacity(self.subsections.len());
        for (_, _, payload) in &self.subsections {
            payload_offsets.push(u32::try_from(image.len() - base).unwrap());
            image.extend_from_slice(payload);
        }

        let directory_offset = u32::try_from(image.len() - base).unwrap();
        image[base+4..base+8].copy_from_slice(&directory_offset.to_le_bytes());

        image.extend_from_slice(&u16::try_from(self.subsections.len()).unwrap().to_le_bytes());
        for ((subsection_type, module_index, payload), payload_offset) in self.subsections.iter().zip(&payload_offsets) {
            image.extend_from_slice(&subsection_type.to_le_bytes());
            image.extend_from_slice(&module_index.to_le_bytes());
            image.extend_from_slice(&payload_offset.to_le_bytes());
            image.extend_from_slice(&u16::try_from(payload.len()).unwrap().to_le_bytes());
        }

        image.extend_from_slice(&self.signature);
        let back_offset = u32::try_from(image.len() + 4 - base).unwrap();
        image.extend_from_slice(&back_offset.to_le_bytes());
        image
    }
}
