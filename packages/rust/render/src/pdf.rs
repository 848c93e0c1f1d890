//! PDF writer for laid-out pages.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, Rgb};

use prospectbrief_shared::{BriefError, Result};

use crate::layout::{FontFace, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, Page};

const LAYER_NAME: &str = "Brief";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: FontFace) -> &IndirectFontRef {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
            FontFace::Italic => &self.italic,
        }
    }
}

/// Write `pages` to `path` using the built-in Helvetica family.
pub(crate) fn write_pdf(title: &str, pages: &[Page], path: &Path) -> Result<()> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);

    let font = |builtin| {
        doc.add_builtin_font(builtin)
            .map_err(|e| BriefError::Rendering(format!("failed to load font: {e:?}")))
    };
    let fonts = Fonts {
        regular: font(BuiltinFont::Helvetica)?,
        bold: font(BuiltinFont::HelveticaBold)?,
        italic: font(BuiltinFont::HelveticaOblique)?,
    };

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for run in &page.runs {
            let (r, g, b) = run.style.rgb;
            layer.set_fill_color(Color::Rgb(Rgb::new(
                f32::from(r) / 255.0,
                f32::from(g) / 255.0,
                f32::from(b) / 255.0,
                None,
            )));
            layer.use_text(
                run.text.as_str(),
                run.style.size_pt,
                Mm(run.x_mm),
                Mm(run.baseline_from_bottom_mm()),
                fonts.get(run.style.face),
            );
        }
    }

    let file = File::create(path).map_err(|e| BriefError::io(path, e))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| BriefError::Rendering(format!("failed to write PDF: {e:?}")))
}
