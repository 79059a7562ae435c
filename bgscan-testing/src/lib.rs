//! bgscan-testing: Scripted collaborators for bgscan tests.
//!
//! [`ScriptedCodec`] plays back a fixed block sequence. Blocks are addressed
//! by stream position (header at offset 0, block `i` header at `1 + 2i`,
//! its payload at `2 + 2i`) so rewinds, seeks and skips made through a real
//! stream behave the way they do against a real container.

use bgscan_core::{
    BinarizeConfig, BlockCodec, BlockHeader, BlockPayload, BlockType, ChecksumType, Converter,
    FileHeader, GCodeEncoding, MetadataEncoding, Outcome, ResultCode, ThumbnailFormat,
    ThumbnailParams,
};
use std::io::{Read, Seek, SeekFrom, Write};

/// One block of a scripted container.
#[derive(Debug, Clone)]
pub struct ScriptedBlock {
    /// Block type reported by the header.
    pub block_type: BlockType,
    /// Payload returned on decode.
    pub payload: Outcome<BlockPayload>,
    /// Error returned instead of the header, if set.
    pub header_error: Option<ResultCode>,
}

/// Codec playing back a scripted block sequence.
#[derive(Debug, Clone)]
pub struct ScriptedCodec {
    file_header: Outcome<FileHeader>,
    blocks: Vec<ScriptedBlock>,
    decoded: Vec<BlockType>,
    skipped: Vec<BlockType>,
    header_reads: usize,
}

impl Default for ScriptedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCodec {
    /// Creates an empty container with a valid version 1 header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            file_header: Ok(FileHeader::new(ChecksumType::Crc32)),
            blocks: Vec::new(),
            decoded: Vec::new(),
            skipped: Vec::new(),
            header_reads: 0,
        }
    }

    /// Replaces the file header.
    #[must_use]
    pub fn with_file_header(mut self, header: FileHeader) -> Self {
        self.file_header = Ok(header);
        self
    }

    /// Makes file header decoding fail with `code`.
    #[must_use]
    pub fn with_header_error(mut self, code: ResultCode) -> Self {
        self.file_header = Err(code);
        self
    }

    /// Appends a block with an arbitrary payload.
    #[must_use]
    pub fn block(mut self, block_type: BlockType, payload: BlockPayload) -> Self {
        self.blocks.push(ScriptedBlock {
            block_type,
            payload: Ok(payload),
            header_error: None,
        });
        self
    }

    /// Appends an INI metadata block.
    #[must_use]
    pub fn metadata(self, block_type: BlockType, entries: &[(&str, &str)]) -> Self {
        let entries = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.block(
            block_type,
            BlockPayload::Metadata {
                encoding: MetadataEncoding::Ini,
                entries,
            },
        )
    }

    /// Appends a thumbnail block.
    #[must_use]
    pub fn thumbnail(self, format: ThumbnailFormat, width: u16, height: u16, data: &[u8]) -> Self {
        self.block(
            BlockType::Thumbnail,
            BlockPayload::Thumbnail {
                params: ThumbnailParams::new(format, width, height),
                data: data.to_vec(),
            },
        )
    }

    /// Appends a G-code block.
    #[must_use]
    pub fn gcode(self, text: &str) -> Self {
        self.block(
            BlockType::GCode,
            BlockPayload::GCode {
                encoding: GCodeEncoding::MeatPackComments,
                text: text.to_string(),
            },
        )
    }

    /// Appends a block whose payload fails to decode with `code`.
    #[must_use]
    pub fn corrupt(mut self, block_type: BlockType, code: ResultCode) -> Self {
        self.blocks.push(ScriptedBlock {
            block_type,
            payload: Err(code),
            header_error: None,
        });
        self
    }

    /// Appends a block whose header fails to decode with `code`.
    #[must_use]
    pub fn broken_header(mut self, code: ResultCode) -> Self {
        self.blocks.push(ScriptedBlock {
            block_type: BlockType::Unknown(u16::MAX),
            payload: Err(code),
            header_error: Some(code),
        });
        self
    }

    /// Number of scripted blocks.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Length of a stream backing this script.
    #[must_use]
    pub fn stream_len(&self) -> u64 {
        1 + 2 * self.blocks.len() as u64
    }

    /// Zero-filled bytes of the right length to back this script.
    #[must_use]
    pub fn stream_bytes(&self) -> Vec<u8> {
        let len = usize::try_from(self.stream_len()).unwrap_or(usize::MAX);
        vec![0; len]
    }

    /// Block types whose payload was decoded, in call order.
    #[must_use]
    pub fn decoded(&self) -> &[BlockType] {
        &self.decoded
    }

    /// Block types whose payload was skipped, in call order.
    #[must_use]
    pub fn skipped(&self) -> &[BlockType] {
        &self.skipped
    }

    /// Number of file header decodes.
    #[must_use]
    pub fn header_reads(&self) -> usize {
        self.header_reads
    }

    /// Clears the decode log.
    pub fn clear_log(&mut self) {
        self.decoded.clear();
        self.skipped.clear();
        self.header_reads = 0;
    }

    /// Builds the block script a binarizer would produce from ASCII G-code.
    ///
    /// - `; generated by <producer>` becomes file metadata (`Producer`).
    /// - `; key = value` comments become printer metadata. Print statistics
    ///   are copied into print metadata, everything else into slicer metadata.
    /// - `; thumbnail[_FMT] begin WxH <len>` sections become thumbnails whose
    ///   data is the text of the section's comment lines.
    /// - Remaining commands form a single G-code block.
    #[must_use]
    pub fn from_ascii(text: &str) -> Self {
        let mut producer = None;
        let mut printer = Vec::new();
        let mut print = Vec::new();
        let mut slicer = Vec::new();
        let mut thumbnails = Vec::new();
        let mut section: Option<(ThumbnailParams, Vec<u8>)> = None;
        let mut gcode = String::new();

        for line in text.lines() {
            let Some(comment) = line.strip_prefix(';').map(str::trim) else {
                if !line.trim().is_empty() {
                    gcode.push_str(line);
                    gcode.push('\n');
                }
                continue;
            };

            if section.is_some() {
                if is_thumbnail_end(comment) {
                    thumbnails.extend(section.take());
                } else if let Some((_, data)) = section.as_mut() {
                    data.extend_from_slice(comment.as_bytes());
                }
            } else if let Some(params) = thumbnail_begin(comment) {
                section = Some((params, Vec::new()));
            } else if let Some(name) = comment.strip_prefix("generated by ") {
                producer = Some(name.trim().to_string());
            } else if let Some((key, value)) = comment.split_once(" = ") {
                let entry = (key.trim(), value.trim());
                printer.push(entry);
                if is_print_statistic(entry.0) {
                    print.push(entry);
                } else {
                    slicer.push(entry);
                }
            }
        }

        let mut codec = Self::new();
        if let Some(producer) = &producer {
            codec = codec.metadata(BlockType::FileMetadata, &[("Producer", producer.as_str())]);
        }
        codec = codec.metadata(BlockType::PrinterMetadata, &printer);
        for (params, data) in thumbnails {
            codec = codec.block(BlockType::Thumbnail, BlockPayload::Thumbnail { params, data });
        }
        codec = codec
            .metadata(BlockType::PrintMetadata, &print)
            .metadata(BlockType::SlicerMetadata, &slicer);
        if !gcode.is_empty() {
            codec = codec.gcode(&gcode);
        }
        codec
    }

    fn header_offset(index: usize) -> u64 {
        1 + 2 * index as u64
    }

    fn block_index(position: u64) -> Option<usize> {
        if position == 0 || (position - 1) % 2 != 0 {
            return None;
        }
        usize::try_from((position - 1) / 2).ok()
    }

    fn block_header(&self, index: usize) -> BlockHeader {
        let block = &self.blocks[index];
        let size = match &block.payload {
            Ok(BlockPayload::Metadata { entries, .. }) => entries
                .iter()
                .map(|(k, v)| k.len() + v.len() + 2)
                .sum::<usize>(),
            Ok(BlockPayload::Thumbnail { data, .. }) => data.len(),
            Ok(BlockPayload::GCode { text, .. }) => text.len(),
            Err(_) => 0,
        };
        BlockHeader::new(
            block.block_type,
            u32::try_from(size).unwrap_or(u32::MAX),
            Self::header_offset(index),
        )
    }

    fn payload_index<S: Seek>(&self, stream: &mut S, block_header: &BlockHeader) -> Outcome<usize> {
        let position = position(stream)?;
        if position != block_header.position + 1 {
            return Err(ResultCode::ReadError);
        }
        let index = Self::block_index(block_header.position).ok_or(ResultCode::ReadError)?;
        if index >= self.blocks.len() {
            return Err(ResultCode::ReadError);
        }
        Ok(index)
    }
}

fn thumbnail_begin(comment: &str) -> Option<ThumbnailParams> {
    let mut words = comment.split_whitespace();
    let format = match words.next()? {
        "thumbnail" | "thumbnail_PNG" => ThumbnailFormat::Png,
        "thumbnail_JPG" => ThumbnailFormat::Jpg,
        "thumbnail_QOI" => ThumbnailFormat::Qoi,
        _ => return None,
    };
    if words.next()? != "begin" {
        return None;
    }
    let (width, height) = words.next()?.split_once('x')?;
    Some(ThumbnailParams::new(
        format,
        width.parse().ok()?,
        height.parse().ok()?,
    ))
}

fn is_thumbnail_end(comment: &str) -> bool {
    let mut words = comment.split_whitespace();
    words.next().is_some_and(|tag| tag.starts_with("thumbnail")) && words.next() == Some("end")
}

fn is_print_statistic(key: &str) -> bool {
    ["filament used", "filament cost", "total filament", "estimated"]
        .iter()
        .any(|prefix| key.starts_with(prefix))
}

fn position<S: Seek>(stream: &mut S) -> Outcome<u64> {
    stream.stream_position().map_err(|_| ResultCode::ReadError)
}

fn seek_to<S: Seek>(stream: &mut S, offset: u64) -> Outcome<()> {
    stream
        .seek(SeekFrom::Start(offset))
        .map(|_| ())
        .map_err(|_| ResultCode::ReadError)
}

impl BlockCodec for ScriptedCodec {
    fn decode_file_header<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        max_version: Option<u32>,
    ) -> Outcome<FileHeader> {
        self.header_reads += 1;
        if position(stream)? != 0 {
            return Err(ResultCode::ReadError);
        }
        let header = self.file_header?;
        if !header.has_valid_magic() {
            return Err(ResultCode::InvalidMagicNumber);
        }
        if max_version.is_some_and(|max| header.version > max) {
            return Err(ResultCode::InvalidVersionNumber);
        }
        seek_to(stream, 1)?;
        Ok(header)
    }

    fn decode_next_block_header<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        _file_header: &FileHeader,
        wanted: Option<BlockType>,
    ) -> Outcome<BlockHeader> {
        let start = position(stream)?;
        let mut index = Self::block_index(start).ok_or(ResultCode::ReadError)?;

        loop {
            if index >= self.blocks.len() {
                return match wanted {
                    Some(_) => {
                        seek_to(stream, start)?;
                        Err(ResultCode::BlockNotFound)
                    }
                    None => Err(ResultCode::ReadError),
                };
            }
            if let Some(code) = self.blocks[index].header_error {
                return Err(code);
            }

            let header = self.block_header(index);
            if wanted.is_none_or(|ty| ty == header.block_type) {
                seek_to(stream, header.position + 1)?;
                return Ok(header);
            }
            index += 1;
        }
    }

    fn decode_block_payload<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        _file_header: &FileHeader,
        block_header: &BlockHeader,
    ) -> Outcome<BlockPayload> {
        let index = self.payload_index(stream, block_header)?;
        self.decoded.push(block_header.block_type);
        seek_to(stream, Self::header_offset(index + 1))?;
        self.blocks[index].payload.clone()
    }

    fn skip_block_payload<S: Read + Seek>(
        &mut self,
        stream: &mut S,
        _file_header: &FileHeader,
        block_header: &BlockHeader,
    ) -> Outcome<()> {
        let index = self.payload_index(stream, block_header)?;
        self.skipped.push(block_header.block_type);
        seek_to(stream, Self::header_offset(index + 1))
    }
}

/// Converter returning scripted outputs.
#[derive(Debug, Clone)]
pub struct ScriptedConverter {
    binary: Outcome<Vec<u8>>,
    ascii: Outcome<String>,
    from_source: bool,
    binarized: Option<ScriptedCodec>,
    calls: Vec<&'static str>,
    last_config: Option<BinarizeConfig>,
}

impl ScriptedConverter {
    /// Creates a converter producing `binary` for ASCII input and `ascii`
    /// for binary input.
    #[must_use]
    pub fn new(binary: Vec<u8>, ascii: &str) -> Self {
        Self {
            binary: Ok(binary),
            ascii: Ok(ascii.to_string()),
            from_source: false,
            binarized: None,
            calls: Vec::new(),
            last_config: None,
        }
    }

    /// Creates a converter that binarizes its ASCII input into the block
    /// script [`ScriptedCodec::from_ascii`] derives from it, and converts
    /// binary input back to the last ASCII input.
    #[must_use]
    pub fn from_source() -> Self {
        Self {
            from_source: true,
            ..Self::new(Vec::new(), "")
        }
    }

    /// Block script of the last ASCII input, for a converter created with
    /// [`ScriptedConverter::from_source`].
    #[must_use]
    pub fn binarized(&self) -> Option<&ScriptedCodec> {
        self.binarized.as_ref()
    }

    /// Makes ASCII to binary conversion fail with `code`.
    #[must_use]
    pub fn failing_binarize(mut self, code: ResultCode) -> Self {
        self.binary = Err(code);
        self
    }

    /// Conversion directions invoked, in call order.
    #[must_use]
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    /// Configuration passed to the last ASCII to binary conversion.
    #[must_use]
    pub fn last_config(&self) -> Option<&BinarizeConfig> {
        self.last_config.as_ref()
    }
}

impl Converter for ScriptedConverter {
    fn ascii_to_binary<R: Read + Seek, W: Write + Seek>(
        &mut self,
        src: &mut R,
        dst: &mut W,
        config: &BinarizeConfig,
    ) -> Outcome<()> {
        self.calls.push("ascii_to_binary");
        self.last_config = Some(*config);

        let mut text = String::new();
        src.read_to_string(&mut text)
            .map_err(|_| ResultCode::ReadError)?;
        if text.is_empty() {
            return Err(ResultCode::InvalidAsciiGCodeFile);
        }
        if text.as_bytes().starts_with(&FileHeader::MAGIC) {
            return Err(ResultCode::AlreadyBinarized);
        }

        let mut binary = self.binary.clone()?;
        if self.from_source {
            let codec = ScriptedCodec::from_ascii(&text);
            binary = codec.stream_bytes();
            self.binarized = Some(codec);
            self.ascii = Ok(text);
        }
        dst.write_all(&binary).map_err(|_| ResultCode::WriteError)
    }

    fn binary_to_ascii<R: Read + Seek, W: Write + Seek>(
        &mut self,
        _src: &mut R,
        dst: &mut W,
        _verify_checksum: bool,
    ) -> Outcome<()> {
        self.calls.push("binary_to_ascii");
        let ascii = self.ascii.clone()?;
        dst.write_all(ascii.as_bytes())
            .map_err(|_| ResultCode::WriteError)
    }
}

/// Printer settings of the MINI sample print.
pub const MINI_PRINTER_METADATA: &[(&str, &str)] = &[
    ("printer_model", "MINI"),
    ("filament_type", "PETG"),
    ("nozzle_diameter", "0.4"),
    ("bed_temperature", "90"),
    ("brim_width", "0"),
    ("fill_density", "15%"),
    ("layer_height", "0.15"),
    ("temperature", "240"),
    ("ironing", "0"),
    ("support_material", "0"),
    ("max_layer_z", "18.05"),
    ("extruder_colour", "\"\""),
    ("filament used [mm]", "986.61"),
    ("filament used [cm3]", "2.37"),
    ("filament used [g]", "3.01"),
    ("filament cost", "0.08"),
    ("estimated printing time (normal mode)", "32m 6s"),
];

/// File metadata of the MINI sample print.
pub const MINI_FILE_METADATA: &[(&str, &str)] = &[("Producer", "PrusaSlicer 2.6.0")];

/// Print statistics of the MINI sample print.
pub const MINI_PRINT_METADATA: &[(&str, &str)] = &[
    ("filament used [mm]", "986.61"),
    ("filament used [cm3]", "2.37"),
    ("filament used [g]", "3.01"),
    ("filament cost", "0.08"),
    ("total filament used [g]", "3.01"),
    ("total filament cost", "0.08"),
    ("estimated printing time (normal mode)", "32m 6s"),
    ("estimated first layer printing time (normal mode)", "1m 8s"),
];

/// Number of slicer configuration entries in the MINI sample print.
pub const MINI_SLICER_ENTRIES: usize = 302;

/// PNG signature followed by a few bytes of image data.
pub const SMALL_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

/// QOI magic followed by a few bytes of image data.
pub const LARGE_QOI: &[u8] = &[b'q', b'o', b'i', b'f', 0, 0, 1, 57, 0, 0, 0, 173, 4, 0];

/// ASCII G-code the MINI sample was binarized from (abridged).
pub const MINI_ASCII_GCODE: &str = "\
; generated by PrusaSlicer 2.6.0
; thumbnail begin 16x16 12
; iVBORw0KGgo=
; thumbnail end
; thumbnail_QOI begin 313x173 8
; cW9pZg==
; thumbnail_QOI end
M73 P0 R32
G28 ; home all without mesh bed level
G1 Z0.2 F720
; printer_model = MINI
; filament_type = PETG
";

fn slicer_entries() -> Vec<(String, String)> {
    (0..MINI_SLICER_ENTRIES)
        .map(|i| (format!("slicer_option_{i:03}"), i.to_string()))
        .collect()
}

/// The two-thumbnail MINI/PETG sample print in canonical block order.
#[must_use]
pub fn prusa_mini_sample() -> ScriptedCodec {
    ScriptedCodec::new()
        .metadata(BlockType::FileMetadata, MINI_FILE_METADATA)
        .metadata(BlockType::PrinterMetadata, MINI_PRINTER_METADATA)
        .thumbnail(ThumbnailFormat::Png, 16, 16, SMALL_PNG)
        .thumbnail(ThumbnailFormat::Qoi, 313, 173, LARGE_QOI)
        .metadata(BlockType::PrintMetadata, MINI_PRINT_METADATA)
        .block(
            BlockType::SlicerMetadata,
            BlockPayload::Metadata {
                encoding: MetadataEncoding::Ini,
                entries: slicer_entries(),
            },
        )
        .gcode("M73 P0 R32\nG28\n")
        .gcode("G1 Z0.2 F720\n")
        .gcode("M84\n")
}
