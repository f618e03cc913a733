use super::*;

use std::{fs, io::Write};

// Assemble a minimal zim archive in memory. Entries and clusters are
// laid out in the order they were added, url-pointers come out already
// ascending.
#[derive(Default)]
struct Archive {
    mimes: Vec<&'static str>,
    entries: Vec<Vec<u8>>,
    clusters: Vec<Vec<u8>>,
    magic: Option<u32>,
}

impl Archive {
    fn to_bytes(&self) -> Vec<u8> {
        let mime_bytes: Vec<u8> = {
            let mut bs = vec![];
            for m in self.mimes.iter() {
                bs.extend_from_slice(m.as_bytes());
                bs.push(0);
            }
            bs.push(0);
            bs
        };

        let mime_list_pos = 80_u64;
        let entries_pos = mime_list_pos + (mime_bytes.len() as u64);
        let entries_len: u64 = self.entries.iter().map(|e| e.len() as u64).sum();
        let url_ptr_pos = entries_pos + entries_len;
        let cluster_ptr_pos = url_ptr_pos + (self.entries.len() as u64 * 8);
        let clusters_pos = cluster_ptr_pos + (self.clusters.len() as u64 * 8);
        let clusters_len: u64 = self.clusters.iter().map(|c| c.len() as u64).sum();
        let checksum_pos = clusters_pos + clusters_len;

        let mut out = vec![];
        out.extend_from_slice(&self.magic.unwrap_or(MAGIC).to_le_bytes());
        out.extend_from_slice(&5_u16.to_le_bytes()); // major_version
        out.extend_from_slice(&0_u16.to_le_bytes()); // minor_version
        out.extend_from_slice(&[0xab; 16]); // uuid
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.clusters.len() as u32).to_le_bytes());
        out.extend_from_slice(&url_ptr_pos.to_le_bytes());
        out.extend_from_slice(&url_ptr_pos.to_le_bytes()); // title_ptr_pos
        out.extend_from_slice(&cluster_ptr_pos.to_le_bytes());
        out.extend_from_slice(&mime_list_pos.to_le_bytes());
        out.extend_from_slice(&0xffffffff_u32.to_le_bytes()); // main_page
        out.extend_from_slice(&0xffffffff_u32.to_le_bytes()); // layout_page
        out.extend_from_slice(&checksum_pos.to_le_bytes());
        assert_eq!(out.len(), 80);

        out.extend_from_slice(&mime_bytes);
        for entry in self.entries.iter() {
            out.extend_from_slice(entry);
        }
        {
            let mut fpos = entries_pos;
            for entry in self.entries.iter() {
                out.extend_from_slice(&fpos.to_le_bytes());
                fpos += entry.len() as u64;
            }
        }
        {
            let mut fpos = clusters_pos;
            for cluster in self.clusters.iter() {
                out.extend_from_slice(&fpos.to_le_bytes());
                fpos += cluster.len() as u64;
            }
        }
        for cluster in self.clusters.iter() {
            out.extend_from_slice(cluster);
        }
        out.extend_from_slice(&[0; 16]); // md5 checksum, not verified

        out
    }

    fn to_file(&self, name: &str) -> std::path::PathBuf {
        let mut loc = std::env::temp_dir();
        loc.push(format!("wikicorpus-zim-test-{}.zim", name));
        fs::write(&loc, self.to_bytes()).unwrap();
        loc
    }
}

fn content_entry(mime: u16, ns: u8, cluster: u32, blob: u32, url: &str, title: &str) -> Vec<u8> {
    let mut bs = vec![];
    bs.extend_from_slice(&mime.to_le_bytes());
    bs.push(0); // parameter length
    bs.push(ns);
    bs.extend_from_slice(&0_u32.to_le_bytes()); // revision
    bs.extend_from_slice(&cluster.to_le_bytes());
    bs.extend_from_slice(&blob.to_le_bytes());
    bs.extend_from_slice(url.as_bytes());
    bs.push(0);
    bs.extend_from_slice(title.as_bytes());
    bs.push(0);
    bs
}

fn redirect_entry(ns: u8, target: u32, url: &str, title: &str) -> Vec<u8> {
    let mut bs = vec![];
    bs.extend_from_slice(&0xFFFF_u16.to_le_bytes());
    bs.push(0);
    bs.push(ns);
    bs.extend_from_slice(&0_u32.to_le_bytes());
    bs.extend_from_slice(&target.to_le_bytes());
    bs.extend_from_slice(url.as_bytes());
    bs.push(0);
    bs.extend_from_slice(title.as_bytes());
    bs.push(0);
    bs
}

// offset table plus concatenated blobs, offsets measured from the start
// of the table. This is the layout inside compressed sub-streams.
fn cluster_body(blobs: &[&[u8]]) -> Vec<u8> {
    let n_offsets = (blobs.len() + 1) as u32;
    let mut offsets = vec![n_offsets * 4];
    for blob in blobs.iter() {
        offsets.push(offsets.last().unwrap() + (blob.len() as u32));
    }

    let mut out = vec![];
    for off in offsets.into_iter() {
        out.extend_from_slice(&off.to_le_bytes());
    }
    for blob in blobs.iter() {
        out.extend_from_slice(blob);
    }
    out
}

// uncompressed layout: compression byte, offset table, three reserved
// bytes, blobs; blob offsets are measured from cluster-start + 4.
fn cluster_plain(blobs: &[&[u8]]) -> Vec<u8> {
    let body = cluster_body(blobs);
    let table_len = (blobs.len() + 1) * 4;

    let mut out = vec![1_u8];
    out.extend_from_slice(&body[..table_len]);
    out.extend_from_slice(&[0, 0, 0]);
    out.extend_from_slice(&body[table_len..]);
    out
}

fn cluster_lzma(blobs: &[&[u8]]) -> Vec<u8> {
    let mut enc = xz2::write::XzEncoder::new(vec![4_u8], 6);
    enc.write_all(&cluster_body(blobs)).unwrap();
    enc.finish().unwrap()
}

fn cluster_zstd(blobs: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![5_u8];
    let comp = zstd::stream::encode_all(cluster_body(blobs).as_slice(), 3).unwrap();
    out.extend_from_slice(&comp);
    out
}

fn sample_archive() -> Archive {
    let mut archive = Archive::default();
    archive.mimes = vec!["text/html", "image/png"];
    archive.clusters = vec![
        cluster_plain(&[b"blob-zero", b"blob-one"]),
        cluster_lzma(&[b"xz-blob"]),
        cluster_zstd(&[b"zstd-blob"]),
    ];
    archive.entries = vec![
        content_entry(0, b'A', 0, 0, "Alpha", "Alpha title"),
        content_entry(0, b'A', 0, 1, "Bravo", "Bravo title"),
        content_entry(0, b'A', 1, 0, "Charlie", "Charlie title"),
        redirect_entry(b'A', 0, "Delta", "Delta title"),
        redirect_entry(b'A', 2, "Echo", "Echo title"),
        content_entry(1, b'A', 2, 0, "Icon", "png, skipped"),
        content_entry(0, b'I', 2, 0, "Inner", "namespace, skipped"),
        {
            let mut entry = content_entry(0, b'A', 0, 0, "Deleted", "skipped");
            entry[..2].copy_from_slice(&0xFFFE_u16.to_le_bytes());
            entry
        },
    ];
    archive
}

#[test]
fn test_bad_magic() {
    let mut archive = sample_archive();
    archive.magic = Some(0xdeadbeef);
    let loc = archive.to_file("bad-magic");

    match Zimf::open(&loc) {
        Err(Error::InvalidFormat(_, _)) => (),
        res => panic!("unexpected {:?}", res.map(|_| ())),
    }
    fs::remove_file(&loc).ok();
}

#[test]
fn test_open() {
    let loc = sample_archive().to_file("open");
    let z = Zimf::open(&loc).unwrap();

    let header = z.as_header();
    assert_eq!(header.magic_number, MAGIC);
    assert_eq!(header.entry_count, 8);
    assert_eq!(header.cluster_count, 3);
    assert_eq!(z.as_mimes().len(), 2);
    assert_eq!(z.as_mimes()[0].as_str(), "text/html");
    assert!(z.to_json().contains("file_loc"));

    fs::remove_file(&loc).ok();
}

#[test]
fn test_scan() {
    let loc = sample_archive().to_file("scan");
    let mut z = Zimf::open(&loc).unwrap();
    let scan = z.scan().unwrap();

    assert_eq!(scan.articles.len(), 3);
    assert_eq!(scan.redirects.len(), 2);
    // 3 articles + 2 redirects retained, skipped entries don't get urls.
    assert_eq!(scan.urls.len(), 5);

    assert_eq!(scan.articles[0].url, "Alpha");
    assert_eq!(scan.articles[0].cluster_num, 0);
    assert_eq!(scan.articles[0].blob_num, 0);
    assert_eq!(scan.articles[2].url, "Charlie");
    assert_eq!(scan.articles[2].cluster_num, 1);

    assert_eq!(scan.redirects[0].url, "Delta");
    assert_eq!(scan.urls.get(&scan.redirects[0].target).unwrap(), "Alpha");
    assert_eq!(scan.urls.get(&scan.redirects[1].target).unwrap(), "Charlie");

    fs::remove_file(&loc).ok();
}

#[test]
fn test_clusters() {
    let loc = sample_archive().to_file("clusters");
    let mut z = Zimf::open(&loc).unwrap();

    let cluster = z.load_cluster(0).unwrap();
    assert_eq!(cluster.n_blobs(), 2);
    assert_eq!(cluster.get_blob(0).unwrap(), b"blob-zero");
    assert_eq!(cluster.get_blob(1).unwrap(), b"blob-one");
    match cluster.get_blob(2) {
        Err(Error::InvalidInput(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }

    let cluster = z.load_cluster(1).unwrap();
    assert_eq!(cluster.n_blobs(), 1);
    assert_eq!(cluster.get_blob(0).unwrap(), b"xz-blob");

    let cluster = z.load_cluster(2).unwrap();
    assert_eq!(cluster.n_blobs(), 1);
    assert_eq!(cluster.get_blob(0).unwrap(), b"zstd-blob");

    match z.load_cluster(3) {
        Err(Error::InvalidInput(_, _)) => (),
        res => panic!("unexpected {:?}", res.map(|_| ())),
    }

    fs::remove_file(&loc).ok();
}

#[test]
fn test_cluster_unsupported() {
    let mut archive = sample_archive();
    archive.clusters[0][0] = 3; // bzip2
    let loc = archive.to_file("unsupported");
    let mut z = Zimf::open(&loc).unwrap();
    match z.load_cluster(0) {
        Err(Error::Unsupported(_, _)) => (),
        res => panic!("unexpected {:?}", res.map(|_| ())),
    }
    fs::remove_file(&loc).ok();

    let mut archive = sample_archive();
    archive.clusters[0][0] = 0x11; // 64-bit offset table
    let loc = archive.to_file("extended");
    let mut z = Zimf::open(&loc).unwrap();
    match z.load_cluster(0) {
        Err(Error::Unsupported(_, _)) => (),
        res => panic!("unexpected {:?}", res.map(|_| ())),
    }
    fs::remove_file(&loc).ok();
}
