use binread::{BinRead, BinReaderExt};

use std::{
    collections::BTreeMap,
    convert::{TryFrom, TryInto},
    ffi, fmt, io, path, result,
};

use crate::{util, zimf::Reader, Error, Result};

/// Magic marker for zim archives, `0x044D155A` in little-endian.
pub const MAGIC: u32 = 72_173_914;

/// Compression types allowed in zim archive.
#[derive(Clone, Copy, PartialEq)]
pub enum Compression {
    /// Legacy compression
    Uncompress1 = 0,
    /// Content is uncompressed.
    Uncompress2,
    /// Legacy, deprecated, Zlib compression
    Zlib,
    /// Legacy, deprecated, Bzip2 compression
    Bzip2,
    /// XZ2 compression
    Lzma2,
    /// Zstd compression
    Zstd,
}

impl TryFrom<u8> for Compression {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Compression> {
        match byte & 0xf {
            0 => Ok(Compression::Uncompress1),
            1 => Ok(Compression::Uncompress2),
            2 => Ok(Compression::Zlib),
            3 => Ok(Compression::Bzip2),
            4 => Ok(Compression::Lzma2),
            5 => Ok(Compression::Zstd),
            c => err_at!(InvalidFormat, msg: "invalid compression byte {}", c),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        match self {
            Compression::Uncompress1 => write!(f, "Uncompress1"),
            Compression::Uncompress2 => write!(f, "Uncompress2"),
            Compression::Zlib => write!(f, "Zlib"),
            Compression::Bzip2 => write!(f, "Bzip2"),
            Compression::Lzma2 => write!(f, "Lzma2"),
            Compression::Zstd => write!(f, "Zstd"),
        }
    }
}

impl fmt::Debug for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self)
    }
}

/// Zim archive file's [Header](https://openzim.org/wiki/ZIM_file_format#Header)
#[derive(Clone, BinRead)]
pub struct Header {
    pub magic_number: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub uuid: [u8; 16],
    pub entry_count: u32,
    pub cluster_count: u32,
    pub url_ptr_pos: u64,
    pub title_ptr_pos: u64,
    pub cluster_ptr_pos: u64,
    pub mime_list_pos: u64,
    pub main_page: u32,
    pub layout_page: u32,
    pub checksum_pos: u64,
}

impl Header {
    /// Return the zim header information in json formatted string.
    pub fn to_json(&self) -> String {
        let uuid = uuid::Uuid::from_slice(&self.uuid).unwrap();
        format!(
            concat!(
                "{{ ",
                r#""magic_number": "{:x}", "#,
                r#""major_version": {}, "#,
                r#""minor_version": {}, "#,
                r#""uuid": "{}", "#,
                r#""entry_count": {}, "#,
                r#""cluster_count": {}, "#,
                r#""url_ptr_pos": {}, "#,
                r#""title_ptr_pos": {}, "#,
                r#""cluster_ptr_pos": {}, "#,
                r#""mime_list_pos": {}, "#,
                r#""main_page": {}, "#,
                r#""layout_page": "{:x}", "#,
                r#""checksum_pos": {} "#,
                "}}"
            ),
            self.magic_number,
            self.major_version,
            self.minor_version,
            uuid.to_hyphenated().to_string(),
            self.entry_count,
            self.cluster_count,
            self.url_ptr_pos,
            self.title_ptr_pos,
            self.cluster_ptr_pos,
            self.mime_list_pos,
            self.main_page,
            self.layout_page,
            self.checksum_pos,
        )
    }
}

/// Mime string.
#[derive(Clone)]
pub struct Mime(String);

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> result::Result<(), fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> result::Result<(), fmt::Error> {
        write!(f, "{:?}", self.0)
    }
}

impl Mime {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Redirect entry, pointing to another directory entry by its position
/// in the sorted url-pointer array.
#[derive(Clone, Debug)]
pub struct Redirect {
    pub url: String,
    pub title: String,
    pub target: u32,
}

/// Article entry, locating the html body as (cluster, blob).
#[derive(Clone, Debug)]
pub struct ArticleRef {
    pub url: String,
    pub title: String,
    pub cluster_num: u32,
    pub blob_num: u32,
}

/// Outcome of scanning the archive directory. Only entries in the `A`
/// namespace are retained; content entries must be `text/html`.
#[derive(Default)]
pub struct Scan {
    pub redirects: Vec<Redirect>,
    pub articles: Vec<ArticleRef>,
    /// Directory position, in the sorted url-pointer array, to url
    /// mapping for every retained entry. Redirect targets are resolved
    /// against this.
    pub urls: BTreeMap<u32, String>,
}

/// Handle to a zim archive file. Holds the file open and makes random
/// seeks into it for the duration of the extraction run.
pub struct Zimf {
    loc: ffi::OsString,
    rdr: Reader<io::BufReader<std::fs::File>>,
    header: Header,
    mimes: Vec<Mime>,
    entry_offsets: Vec<u64>,   // sorted ascending
    cluster_offsets: Vec<u64>, // indexed by cluster number
    cluster_ends: Vec<u64>,    // sorted copy of cluster_offsets
    file_size: u64,
}

impl Zimf {
    /// Open a zim-archive file in `loc`, load its header, mime-type list
    /// and pointer arrays.
    pub fn open<P>(loc: P) -> Result<Zimf>
    where
        P: AsRef<path::Path>,
    {
        let loc: ffi::OsString = {
            let loc: &path::Path = loc.as_ref();
            loc.as_os_str().to_os_string()
        };
        let fd = util::open_file_r(&loc)?;
        let file_size = err_at!(IOError, fd.metadata())?.len();
        let mut rdr = Reader::new(io::BufReader::new(fd));

        let header: Header = {
            rdr.seek(0)?;
            let buf = rdr.read_bytes(80)?;
            let mut br = binread::io::Cursor::new(&buf);
            err_at!(InvalidFormat, br.read_le())?
        };
        if header.magic_number != MAGIC {
            err_at!(InvalidFormat, msg: "bad magic number {}", header.magic_number)?
        }

        let mimes = {
            rdr.seek(header.mime_list_pos)?;
            let mut mimes = vec![];
            loop {
                match rdr.read_cstring()? {
                    s if s.is_empty() => break mimes,
                    s => mimes.push(Mime(s)),
                }
            }
        };

        let entry_offsets = {
            rdr.seek(header.url_ptr_pos)?;
            let mut offsets = Vec::with_capacity(header.entry_count as usize);
            for _ in 0..header.entry_count {
                offsets.push(rdr.read_u64()?);
            }
            // sorted by file position, so that the directory walk reads
            // the entry region sequentially.
            offsets.sort_unstable();
            offsets
        };

        let cluster_offsets = {
            rdr.seek(header.cluster_ptr_pos)?;
            let mut offsets = Vec::with_capacity(header.cluster_count as usize);
            for _ in 0..header.cluster_count {
                offsets.push(rdr.read_u64()?);
            }
            offsets
        };
        let cluster_ends = {
            let mut ends = cluster_offsets.clone();
            ends.sort_unstable();
            ends
        };

        Ok(Zimf {
            loc,
            rdr,
            header,
            mimes,
            entry_offsets,
            cluster_offsets,
            cluster_ends,
            file_size,
        })
    }

    pub fn to_location(&self) -> ffi::OsString {
        self.loc.clone()
    }

    /// Return the zim-header
    pub fn as_header(&self) -> &Header {
        &self.header
    }

    /// Return the full list of mime-types found in this zim file.
    pub fn as_mimes(&self) -> &[Mime] {
        &self.mimes
    }

    /// Return the file offset for `cluster_num`.
    pub fn to_cluster_offset(&self, cluster_num: u32) -> Result<u64> {
        match self.cluster_offsets.get(cluster_num as usize) {
            Some(off) => Ok(*off),
            None => err_at!(InvalidInput, msg: "cluster {} out of range", cluster_num),
        }
    }

    /// Walk all directory entries, in sorted url-pointer order, and
    /// classify each one as redirect, article or skip.
    pub fn scan(&mut self) -> Result<Scan> {
        let mut scan = Scan::default();

        for index in 0..self.entry_offsets.len() {
            self.rdr.seek(self.entry_offsets[index])?;
            let index = index as u32;

            let mime_type = self.rdr.read_u16()?;
            if mime_type == 0xFFFE || mime_type == 0xFFFD {
                continue;
            }

            self.rdr.seek_rel(1)?; // parameter length
            let namespace = self.rdr.read_u8()?;
            if namespace != b'A' {
                continue;
            }
            self.rdr.seek_rel(4)?; // revision

            if mime_type == 0xFFFF {
                let target = self.rdr.read_u32()?;
                let url = self.rdr.read_cstring()?;
                let title = self.rdr.read_cstring()?;
                scan.urls.insert(index, url.clone());
                scan.redirects.push(Redirect { url, title, target });
            } else {
                let cluster_num = self.rdr.read_u32()?;
                let blob_num = self.rdr.read_u32()?;
                let mime = match self.mimes.get(mime_type as usize) {
                    Some(mime) => mime,
                    None => err_at!(
                        InvalidFormat, msg: "entry {} bad mime-type {}", index, mime_type
                    )?,
                };
                if mime.as_str() != "text/html" {
                    continue;
                }
                let url = self.rdr.read_cstring()?;
                let title = self.rdr.read_cstring()?;
                scan.urls.insert(index, url.clone());
                scan.articles.push(ArticleRef {
                    url,
                    title,
                    cluster_num,
                    blob_num,
                });
            }
        }

        Ok(scan)
    }

    /// Read the cluster body identified by `cluster_num`, decompressing
    /// it when required, and decode its blob-offset table.
    pub fn load_cluster(&mut self, cluster_num: u32) -> Result<ClusterData> {
        use std::io::Read;

        let off = self.to_cluster_offset(cluster_num)?;
        let end = self.cluster_end(off);
        if end <= off {
            err_at!(
                InvalidFormat, msg: "cluster {} bad extent {}..{}", cluster_num, off, end
            )?
        }
        let size = err_at!(FailConvert, usize::try_from(end - off - 1))?;

        self.rdr.seek(off)?;
        let info = self.rdr.read_u8()?;
        if info & 0x10 != 0 {
            err_at!(Unsupported, msg: "cluster {} has 64-bit offsets", cluster_num)?
        }
        let compression: Compression = info.try_into()?;

        let raw = self.rdr.read_bytes(size)?;
        let (data, skew) = match compression {
            Compression::Uncompress1 | Compression::Uncompress2 => (raw, 3),
            Compression::Lzma2 => {
                let mut data = vec![];
                let mut dec = xz2::read::XzDecoder::new(raw.as_slice());
                err_at!(DecodeFail, dec.read_to_end(&mut data), "cluster {}", cluster_num)?;
                (data, 0)
            }
            Compression::Zstd => {
                let mut data = vec![];
                let mut dec =
                    err_at!(DecodeFail, zstd::stream::read::Decoder::new(raw.as_slice()))?;
                err_at!(DecodeFail, dec.read_to_end(&mut data), "cluster {}", cluster_num)?;
                (data, 0)
            }
            Compression::Zlib | Compression::Bzip2 => {
                err_at!(Unsupported, msg: "cluster compression {}", compression)?
            }
        };

        ClusterData::from_data(data, skew)
    }

    // clusters are laid out back to back, a cluster body ends where the
    // next one starts; the last one ends at the checksum.
    fn cluster_end(&self, off: u64) -> u64 {
        let next = match self.cluster_ends.binary_search(&off) {
            Ok(n) => self.cluster_ends.get(n + 1),
            Err(_) => None,
        };
        match next {
            Some(end) => *end,
            None if self.header.checksum_pos > off => self.header.checksum_pos,
            None => self.file_size,
        }
    }
}

impl Zimf {
    /// Return the zimf information in json formatted string.
    pub fn to_json(&self) -> String {
        format!(
            concat!(
                "{{ ",
                r#""file_loc": {:?}, "#,
                r#""header": {}, "#,
                r#""mimes": {:?} "#,
                "}} "
            ),
            self.loc,
            self.header.to_json(),
            self.mimes,
        )
    }
}

/// Decoded cluster body, blobs are served as borrowed slices.
///
/// The blob-offset table carries `first_offset / 4` entries and blob `i`
/// spans `[offset[i], offset[i+1])`, which makes the last entry a
/// terminator and the blob count one less than the table length. Offsets
/// are measured from the decompressed stream start for compressed
/// clusters, and from cluster-start + 4 for uncompressed ones, hence the
/// skew of 3 into `data` (which begins right after the compression byte).
pub struct ClusterData {
    data: Vec<u8>,
    offsets: Vec<usize>,
    skew: usize,
}

impl ClusterData {
    fn from_data(data: Vec<u8>, skew: usize) -> Result<ClusterData> {
        let first = match data.get(..4) {
            Some(bs) => u32::from_le_bytes(bs.try_into().unwrap()) as usize,
            None => err_at!(InvalidFormat, msg: "truncated cluster")?,
        };
        if first == 0 || (first % 4) != 0 {
            err_at!(InvalidFormat, msg: "bad first blob-offset {}", first)?
        }
        let n_offsets = first / 4;
        if data.len() < (n_offsets * 4) {
            err_at!(InvalidFormat, msg: "truncated blob-offset table {}", n_offsets)?
        }

        let mut offsets = Vec::with_capacity(n_offsets);
        for i in 0..n_offsets {
            let bs = &data[(i * 4)..(i * 4) + 4];
            offsets.push(u32::from_le_bytes(bs.try_into().unwrap()) as usize);
        }
        for (a, b) in offsets.iter().zip(offsets[1..].iter()) {
            if b < a {
                err_at!(InvalidFormat, msg: "blob-offsets not sorted {} {}", a, b)?
            }
        }
        if (skew + offsets[n_offsets - 1]) > data.len() {
            err_at!(
                InvalidFormat, msg: "blob-offset {} out of cluster {}",
                offsets[n_offsets - 1],
                data.len()
            )?
        }

        Ok(ClusterData {
            data,
            offsets,
            skew,
        })
    }

    /// Number of blobs addressable in this cluster.
    pub fn n_blobs(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Return the byte-range for `blob_num`.
    pub fn get_blob(&self, blob_num: u32) -> Result<&[u8]> {
        let blob_num = blob_num as usize;
        if (blob_num + 1) >= self.offsets.len() {
            err_at!(InvalidInput, msg: "blob {} out of range", blob_num)?
        }
        let s = self.skew + self.offsets[blob_num];
        let e = self.skew + self.offsets[blob_num + 1];
        Ok(&self.data[s..e])
    }
}

#[cfg(test)]
#[path = "zim_test.rs"]
mod zim_test;
