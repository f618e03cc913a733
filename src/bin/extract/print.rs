use prettytable::{cell, row};

use wikicorpus::zimf::{Header, Zimf};

pub fn make_info_table(z: &Zimf) -> prettytable::Table {
    let mut table = prettytable::Table::new();
    table.set_titles(row![Fy => "Info", "Value"]);

    let header = z.as_header();

    table.add_row(row!["file_loc", format!("{:?}", z.to_location())]);
    table.add_row(row!["entry_count", header.entry_count]);
    table.add_row(row!["cluster_count", header.cluster_count]);
    table.add_row(row!["mime_count", z.as_mimes().len()]);

    table.set_format(*prettytable::format::consts::FORMAT_CLEAN);
    table
}

pub fn make_header_table(hdr: &Header) -> prettytable::Table {
    let uuid = uuid::Uuid::from_slice(&hdr.uuid).unwrap();

    let mut table = prettytable::Table::new();
    table.set_titles(row![Fy => "Field", "Value"]);

    table.add_row(row!["magic_number", hdr.magic_number]);
    table.add_row(row!["major_version", hdr.major_version]);
    table.add_row(row!["minor_version", hdr.minor_version]);
    table.add_row(row!["uuid", uuid]);
    table.add_row(row!["entry_count", hdr.entry_count]);
    table.add_row(row!["cluster_count", hdr.cluster_count]);
    table.add_row(row!["url_ptr_pos", hdr.url_ptr_pos]);
    table.add_row(row!["title_ptr_pos", hdr.title_ptr_pos]);
    table.add_row(row!["cluster_ptr_pos", hdr.cluster_ptr_pos]);
    table.add_row(row!["mime_list_pos", hdr.mime_list_pos]);
    table.add_row(row!["main_page", hdr.main_page]);
    table.add_row(row!["layout_page", hdr.layout_page]);
    table.add_row(row!["checksum_pos", hdr.checksum_pos]);

    table.set_format(*prettytable::format::consts::FORMAT_CLEAN);
    table
}

pub fn make_mimes_table(z: &Zimf) -> prettytable::Table {
    let mut table = prettytable::Table::new();
    table.set_titles(row![Fy => "Index", "Mime"]);

    for (index, mime) in z.as_mimes().iter().enumerate() {
        table.add_row(row![index, mime]);
    }

    table.set_format(*prettytable::format::consts::FORMAT_CLEAN);
    table
}
