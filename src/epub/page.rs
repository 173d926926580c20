use quick_xml::escape::escape;

use crate::pages::Page;

/// Full-bleed image on black; the same for every page.
const PAGE_STYLE: &str = "
      body {
        margin: 0;
        padding: 0;
        text-align: center;
        background-color: #000;
      }
      img {
        max-width: 100%;
        height: auto;
        display: block;
        margin: 0 auto;
      }
";

/// Generate the XHTML wrapper document for one page.
pub fn page_xhtml(page: &Page) -> String {
    let label = page.label();
    let src = page.image_href();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
  <head>
    <title>{label}</title>
    <style type="text/css">{PAGE_STYLE}    </style>
  </head>
  <body>
    <img src="{src}" alt="{label}"/>
  </body>
</html>
"#,
        label = escape(label.as_str()),
        src = escape(src.as_str()),
    )
}
