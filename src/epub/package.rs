//! Control documents: `container.xml`, `content.opf` and `toc.ncx`.

use quick_xml::escape::escape;

use super::{CONTENT_ROOT, KepubPackage};
use crate::pages::Page;

/// An item in the OPF manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    /// Path relative to the content root.
    pub href: String,
    pub media_type: &'static str,
}

/// A reading-order reference to a page document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    pub idref: String,
}

/// One entry of the flat NCX navigation map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub id: String,
    pub play_order: usize,
    pub label: String,
    pub target_href: String,
}

const XHTML_MEDIA_TYPE: &str = "application/xhtml+xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

/// `META-INF/container.xml`; independent of the pages.
pub fn container_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{CONTENT_ROOT}/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#
    )
}

/// Images first, then page documents, then the NCX.
pub fn manifest_entries(pages: &[Page]) -> Vec<ManifestEntry> {
    let mut entries = Vec::with_capacity(pages.len() * 2 + 1);

    for page in pages {
        entries.push(ManifestEntry {
            id: page.image_id(),
            href: page.image_href(),
            media_type: page.media_type.mime_type(),
        });
    }
    for page in pages {
        entries.push(ManifestEntry {
            id: page.document_id(),
            href: page.document_name(),
            media_type: XHTML_MEDIA_TYPE,
        });
    }
    entries.push(ManifestEntry {
        id: "ncx".to_string(),
        href: "toc.ncx".to_string(),
        media_type: NCX_MEDIA_TYPE,
    });

    entries
}

pub fn spine_entries(pages: &[Page]) -> Vec<SpineEntry> {
    pages
        .iter()
        .map(|page| SpineEntry {
            idref: page.document_id(),
        })
        .collect()
}

pub fn nav_points(pages: &[Page]) -> Vec<NavPoint> {
    pages
        .iter()
        .map(|page| NavPoint {
            id: format!("navpoint-{}", page.sequence_index),
            play_order: page.sequence_index,
            label: page.label(),
            target_href: page.document_name(),
        })
        .collect()
}

/// Generate `content.opf` (OPF 2.0 with Kobo identifiers).
pub fn content_opf(package: &KepubPackage) -> String {
    debug_assert!(!package.pages.is_empty(), "package has no pages");

    let identity = &package.identity;
    let mut opf = String::new();

    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="bookid" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        escape(identity.title.as_str())
    ));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape(package.language.as_str())
    ));
    opf.push_str(&format!(
        "    <dc:identifier id=\"bookid\" opf:scheme=\"UUID\">{}</dc:identifier>\n",
        escape(identity.package_id.as_str())
    ));
    opf.push_str(&format!(
        "    <meta property=\"kobo:book-id\" content=\"{}\"/>\n",
        escape(identity.book_id.as_str())
    ));
    opf.push_str(&format!(
        "    <meta property=\"kobo:content-id\" content=\"{}\"/>\n",
        escape(identity.content_id.as_str())
    ));
    opf.push_str("  </metadata>\n  <manifest>\n");

    for item in manifest_entries(&package.pages) {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
            escape(item.id.as_str()),
            escape(item.href.as_str()),
            item.media_type
        ));
    }

    opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
    for entry in spine_entries(&package.pages) {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", entry.idref));
    }
    opf.push_str("  </spine>\n</package>\n");
    opf
}

/// Generate `toc.ncx` with one flat nav point per page.
///
/// `dtb:totalPageCount` and `dtb:maxPageNumber` are always written as zero.
pub fn toc_ncx(package: &KepubPackage) -> String {
    debug_assert!(!package.pages.is_empty(), "package has no pages");

    let identity = &package.identity;
    let mut ncx = String::new();

    ncx.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="{}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{}</text>
  </docTitle>
  <navMap>
"#,
        escape(identity.package_id.as_str()),
        escape(identity.title.as_str())
    ));

    for point in nav_points(&package.pages) {
        ncx.push_str(&format!(
            "    <navPoint id=\"{}\" playOrder=\"{}\">\n",
            point.id, point.play_order
        ));
        ncx.push_str(&format!(
            "      <navLabel>\n        <text>{}</text>\n      </navLabel>\n",
            escape(point.label.as_str())
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            escape(point.target_href.as_str())
        ));
        ncx.push_str("    </navPoint>\n");
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{BookIdentity, SequentialIds};
    use crate::pages::assign_pages;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn package(names: &[&str]) -> KepubPackage {
        let pages = assign_pages(names.iter().map(PathBuf::from).collect());
        KepubPackage::new(BookIdentity::generate("Test & <Title>", &SequentialIds::new()), pages)
    }

    #[test]
    fn test_container_points_at_package() {
        let xml = container_xml();
        assert!(xml.contains(r#"full-path="OEBPS/content.opf""#));
        assert!(xml.contains(r#"media-type="application/oebps-package+xml""#));
        assert!(xml.contains(r#"xmlns="urn:oasis:names:tc:opendocument:xmlns:container""#));
    }

    #[test]
    fn test_manifest_layout() {
        let entries = manifest_entries(&package(&["a.jpg", "b.gif", "c.png"]).pages);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "img_page_0001.jpg",
                "img_page_0002.gif",
                "img_page_0003.png",
                "page_1",
                "page_2",
                "page_3",
                "ncx"
            ]
        );
        assert_eq!(entries[1].href, "Images/page_0002.gif");
        assert_eq!(entries[1].media_type, "image/gif");
        assert_eq!(entries[4].href, "page_0002.xhtml");
        assert_eq!(entries[6].href, "toc.ncx");
        assert_eq!(entries[6].media_type, "application/x-dtbncx+xml");
    }

    #[test]
    fn test_opf_metadata() {
        let opf = content_opf(&package(&["a.jpg"]));
        assert!(opf.contains("<dc:title>Test &amp; &lt;Title&gt;</dc:title>"));
        assert!(opf.contains("<dc:language>en</dc:language>"));
        assert!(opf.contains(
            r#"<dc:identifier id="bookid" opf:scheme="UUID">urn:uuid:00000000-0000-4000-8000-000000000001</dc:identifier>"#
        ));
        assert!(opf.contains(
            r#"<meta property="kobo:book-id" content="urn:uuid:00000000-0000-4000-8000-000000000002"/>"#
        ));
        assert!(opf.contains(
            r#"<meta property="kobo:content-id" content="urn:uuid:00000000-0000-4000-8000-000000000003"/>"#
        ));
        assert!(opf.contains(r#"<spine toc="ncx">"#));
    }

    #[test]
    fn test_opf_language_override() {
        let opf = content_opf(&package(&["a.jpg"]).with_language("ja"));
        assert!(opf.contains("<dc:language>ja</dc:language>"));
    }

    #[test]
    fn test_ncx_head_and_nav_points() {
        let ncx = toc_ncx(&package(&["a.jpg", "b.jpg"]));
        assert!(ncx.contains(r#"<meta name="dtb:depth" content="1"/>"#));
        assert!(ncx.contains(r#"<meta name="dtb:totalPageCount" content="0"/>"#));
        assert!(ncx.contains(r#"<meta name="dtb:maxPageNumber" content="0"/>"#));
        assert!(ncx.contains(
            r#"<meta name="dtb:uid" content="urn:uuid:00000000-0000-4000-8000-000000000001"/>"#
        ));
        assert!(ncx.contains("<text>Test &amp; &lt;Title&gt;</text>"));
        assert!(ncx.contains(r#"<navPoint id="navpoint-2" playOrder="2">"#));
        assert!(ncx.contains(r#"<content src="page_0002.xhtml"/>"#));
        assert!(ncx.contains("<text>Page 2</text>"));
    }

    proptest! {
        #[test]
        fn prop_spine_and_nav_match_page_order(count in 1usize..60) {
            let names: Vec<String> = (0..count).map(|i| format!("{i:03}.png")).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let pkg = package(&refs);

            let spine = spine_entries(&pkg.pages);
            let nav = nav_points(&pkg.pages);
            let images = manifest_entries(&pkg.pages)
                .into_iter()
                .filter(|e| e.media_type.starts_with("image/"))
                .count();

            prop_assert_eq!(spine.len(), count);
            prop_assert_eq!(nav.len(), count);
            prop_assert_eq!(images, count);
            for (i, (s, n)) in spine.iter().zip(&nav).enumerate() {
                prop_assert_eq!(&s.idref, &format!("page_{}", i + 1));
                prop_assert_eq!(n.play_order, i + 1);
            }
        }
    }
}
