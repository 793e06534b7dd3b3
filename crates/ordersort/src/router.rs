use std::path::PathBuf;

use crate::ledger::OrderRecord;
use crate::photo::PhotoFile;

/// Subdirectory names keyed on raster format.
pub const TIF_FOLDER_NAME: &str = "GeoTiff";
pub const JPG_FOLDER_NAME: &str = "JPG";

/// Product codes that get a friendlier folder name on delivery.
const PRODUCT_NAME_TRANSLATIONS: &[(&str, &str)] = &[("FCIR", "Infrared"), ("RGB", "Color")];

/// Folder name for a product code; the code itself when untranslated.
pub fn translate_product(product: &str) -> &str {
    PRODUCT_NAME_TRANSLATIONS
        .iter()
        .find(|(code, _)| *code == product)
        .map(|(_, name)| *name)
        .unwrap_or(product)
}

/// One computed placement: where the file goes (relative to the target
/// root), what it is called there, and whether the source is copied rather
/// than moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub directory: PathBuf,
    pub filename: String,
    pub copy: bool,
}

/// A customer routing rule; the table below is evaluated in order and the
/// first applicable rule wins.
struct CustomerRule {
    applies: fn(&OrderRecord, &PhotoFile) -> bool,
    routes: fn(&Router, &OrderRecord, &PhotoFile) -> Vec<RoutePlan>,
}

const RULES: &[CustomerRule] = &[
    CustomerRule {
        applies: |order, _| order.customer() == "RD Offutt",
        routes: Router::route_offutt,
    },
    CustomerRule {
        applies: |order, photo| {
            matches!(
                order.customer(),
                "Agri NW" | "Washington Onion" | "Paterson Ferry"
            ) && photo.is_tif()
        },
        routes: Router::route_agri_server,
    },
    CustomerRule {
        applies: |order, _| order.customer() == "Canyon Falls",
        routes: Router::route_canyon_falls,
    },
];

/// Computes destinations for matched files. Pure: no filesystem access.
pub struct Router {
    copy_files: bool,
}

impl Router {
    /// `copy_files` makes every primary placement a copy instead of a move;
    /// secondary placements are copies regardless.
    pub fn new(copy_files: bool) -> Self {
        Self { copy_files }
    }

    /// The placements for one (order, file) pair, in execution order.
    /// Copies always precede the final move so the source is still present.
    pub fn routes(&self, order: &OrderRecord, photo: &PhotoFile) -> Vec<RoutePlan> {
        for rule in RULES {
            if (rule.applies)(order, photo) {
                return (rule.routes)(self, order, photo);
            }
        }
        self.route_default(order, photo)
    }

    /// RD Offutt deliverables all go to Anderson Geographics, renamed down
    /// to date/field/product; files with the exact `jpg` extension
    /// additionally get a copy in the customer's own tree (where the Inland
    /// farm is filed as 3 Mile). The `jpeg` spelling gets the primary only.
    fn route_offutt(&self, order: &OrderRecord, photo: &PhotoFile) -> Vec<RoutePlan> {
        let mut plans = Vec::new();

        if photo.extension == "jpg" {
            let farm = if order.farm() == "Inland" {
                "3 Mile"
            } else {
                order.farm()
            };
            plans.push(RoutePlan {
                directory: [
                    order.customer(),
                    farm,
                    order.manager(),
                    order.crop(),
                    translate_product(&photo.product),
                ]
                .iter()
                .collect(),
                filename: photo.filename.clone(),
                copy: true,
            });
        }

        let format_folder = if photo.is_tif() {
            TIF_FOLDER_NAME
        } else {
            JPG_FOLDER_NAME
        };
        plans.push(RoutePlan {
            directory: ["Anderson Geographics", format_folder].iter().collect(),
            filename: format!(
                "{}_{}_{}.{}",
                photo.date,
                order.field_name().replace(' ', "_"),
                photo.product,
                photo.extension
            ),
            copy: self.copy_files,
        });

        plans
    }

    fn route_agri_server(&self, order: &OrderRecord, photo: &PhotoFile) -> Vec<RoutePlan> {
        vec![RoutePlan {
            directory: ["Agri Server", order.farm()].iter().collect(),
            filename: photo.filename.clone(),
            copy: self.copy_files,
        }]
    }

    fn route_canyon_falls(&self, order: &OrderRecord, photo: &PhotoFile) -> Vec<RoutePlan> {
        let directory: PathBuf = if photo.is_tif() {
            PathBuf::from("Canyon Falls Server")
        } else {
            [
                order.customer(),
                order.manager(),
                order.farm(),
                order.crop(),
                translate_product(&photo.product),
            ]
            .iter()
            .collect()
        };
        vec![RoutePlan {
            directory,
            filename: photo.filename.clone(),
            copy: self.copy_files,
        }]
    }

    fn route_default(&self, order: &OrderRecord, photo: &PhotoFile) -> Vec<RoutePlan> {
        let mut directory: PathBuf = [
            order.customer(),
            order.farm(),
            order.manager(),
            order.crop(),
            translate_product(&photo.product),
        ]
        .iter()
        .collect();
        if photo.is_tif() {
            directory.push(TIF_FOLDER_NAME);
        }
        vec![RoutePlan {
            directory,
            filename: photo.filename.clone(),
            copy: self.copy_files,
        }]
    }
}
