use indicatif::ProgressBar;
use log::warn;

use std::{collections::BTreeMap, ffi, io::Write};

use crate::{
    wiki::{clean, encode_article, flatten, CorpusWriter, Decoder},
    zimf::{ArticleRef, Zimf},
    Result,
};

/// Statistics out of an extraction run.
pub struct ExportStats {
    pub n_articles: usize,
    pub n_redirects: usize,
    pub unknown_tags: BTreeMap<String, usize>,
}

/// Extract articles and redirections from `zim` into a gzip-compressed
/// xml corpus at `output`. Articles are visited cluster by cluster in
/// file-offset order, and within a cluster in blob order, so each
/// cluster is decompressed exactly once, sequentially.
pub fn export(zim: &mut Zimf, output: &ffi::OsStr, lang: &str) -> Result<ExportStats> {
    eprintln!("Discovering items ...");
    let scan = zim.scan()?;

    // resolve redirect targets upfront, the root element's counts must
    // match the emitted children.
    let redirects: Vec<(String, String, String)> = scan
        .redirects
        .iter()
        .filter_map(|r| match scan.urls.get(&r.target) {
            Some(target) => Some((r.url.clone(), r.title.clone(), target.clone())),
            None => {
                warn!("redirect {:?} target {} not retained", r.url, r.target);
                None
            }
        })
        .collect();

    let mut wr = CorpusWriter::create(output, scan.articles.len(), redirects.len(), lang)?;

    eprintln!("Writing redirections ...");
    let pb = ProgressBar::new(redirects.len() as u64);
    for (url, title, target) in redirects.iter() {
        wr.write_redirect(url, title, target)?;
        pb.inc(1);
    }
    pb.finish();

    let mut per_cluster: BTreeMap<u32, Vec<&ArticleRef>> = BTreeMap::new();
    for article in scan.articles.iter() {
        per_cluster.entry(article.cluster_num).or_insert_with(Vec::new).push(article);
    }
    let order: Vec<(u64, u32)> = {
        let mut order = vec![];
        for num in per_cluster.keys() {
            order.push((zim.to_cluster_offset(*num)?, *num));
        }
        order.sort_unstable();
        order
    };

    eprintln!("Writing articles ...");
    let pb = ProgressBar::new(scan.articles.len() as u64);
    let mut decoder = Decoder::new();
    for (_off, cluster_num) in order.into_iter() {
        let cluster = zim.load_cluster(cluster_num)?;
        let mut items = per_cluster.remove(&cluster_num).unwrap();
        items.sort_by_key(|article| article.blob_num);

        for article in items.into_iter() {
            let data = cluster.get_blob(article.blob_num)?;
            let root = decoder.decode(data);
            let seq = clean(flatten(root));
            let element = encode_article(&article.url, &article.title, seq);
            wr.write_article(&element)?;
            pb.inc(1);
        }
    }
    pb.finish();

    let gz = wr.close()?;
    let mut fd = err_at!(IOError, gz.finish())?;
    err_at!(IOError, fd.flush())?;

    Ok(ExportStats {
        n_articles: scan.articles.len(),
        n_redirects: redirects.len(),
        unknown_tags: decoder.as_unknown_tags().clone(),
    })
}

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;
