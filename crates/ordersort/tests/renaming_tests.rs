mod common;

use common::{add_photo, entries_with_prefix, setup, write_form};
use ordersort::parse_and_rename_orders;

#[test]
fn matched_files_get_their_order_pk_appended() {
    let (_tmp, form, source, _target) = setup();
    write_form(
        &form,
        &[
            "17,East,Mint,Basin Gold,Home,,Lee,,,,RGB",
            "18,Circle 7,Potato,RD Offutt,Inland,,Dale,,,,RGB",
        ],
    );
    add_photo(&source, "20240612_Basin_Gold_Home_East_RGB.tif");
    add_photo(&source, "20240612_Basin_Gold_Home_East_RGB.jpg");
    add_photo(&source, "20240612_RD_Offutt_Inland_Circle_7_RGB.tif");

    let tagged = parse_and_rename_orders(&form, &source).unwrap();

    assert_eq!(tagged, 3);
    assert!(source.join("20240612_Basin_Gold_Home_East_RGB_p17.tif").exists());
    assert!(source.join("20240612_Basin_Gold_Home_East_RGB_p17.jpg").exists());
    assert!(source
        .join("20240612_RD_Offutt_Inland_Circle_7_RGB_p18.tif")
        .exists());
    assert!(!source.join("20240612_Basin_Gold_Home_East_RGB.tif").exists());
}

#[test]
fn second_pass_changes_nothing() {
    let (_tmp, form, source, _target) = setup();
    write_form(&form, &["17,East,Mint,Basin Gold,Home,,Lee,,,,RGB"]);
    add_photo(&source, "20240612_Basin_Gold_Home_East_RGB.tif");

    assert_eq!(parse_and_rename_orders(&form, &source).unwrap(), 1);
    // Tagged names no longer match any order, so a rerun is a no-op.
    assert_eq!(parse_and_rename_orders(&form, &source).unwrap(), 0);
    assert!(source.join("20240612_Basin_Gold_Home_East_RGB_p17.tif").exists());
}

#[test]
fn unmatched_files_keep_their_names() {
    let (_tmp, form, source, _target) = setup();
    write_form(&form, &["17,East,Mint,Basin Gold,Home,,Lee,,,,RGB"]);
    add_photo(&source, "20240612_Someone_Else_West_RGB.tif");

    let tagged = parse_and_rename_orders(&form, &source).unwrap();

    assert_eq!(tagged, 0);
    assert!(source.join("20240612_Someone_Else_West_RGB.tif").exists());
}

#[test]
fn orders_without_matches_land_in_the_errors_file() {
    let (tmp, form, source, _target) = setup();
    write_form(
        &form,
        &[
            "17,East,Mint,Basin Gold,Home,,Lee,,,,RGB",
            "18,Nowhere,Mint,Ghost,Farm,,Lee,,,,RGB",
        ],
    );
    add_photo(&source, "20240612_Basin_Gold_Home_East_RGB.tif");

    parse_and_rename_orders(&form, &source).unwrap();

    // Diagnostics land next to the order form.
    let errors = entries_with_prefix(tmp.path(), "Orderform_errors_");
    assert_eq!(errors.len(), 1);
    let content = std::fs::read_to_string(&errors[0]).unwrap();
    assert!(content.contains("no matching images"));
    assert!(content.contains("customer: Ghost"));
    assert!(!content.contains("customer: Basin Gold"));
}

#[test]
fn duplicate_rows_are_reported_and_skipped() {
    let (tmp, form, source, _target) = setup();
    write_form(
        &form,
        &[
            "17,East,Mint,Basin Gold,Home,,Lee,,,,RGB",
            "99,East,Peas,Basin Gold,Home,,Lee,,,,RGB",
        ],
    );
    add_photo(&source, "20240612_Basin_Gold_Home_East_RGB.tif");

    let tagged = parse_and_rename_orders(&form, &source).unwrap();

    // The second row never runs, so the file carries the first row's pk.
    assert_eq!(tagged, 1);
    assert!(source.join("20240612_Basin_Gold_Home_East_RGB_p17.tif").exists());

    let reports = entries_with_prefix(tmp.path(), "Order_duplicates_");
    assert_eq!(reports.len(), 1);
    let content = std::fs::read_to_string(&reports[0]).unwrap();
    assert!(content.contains("pk: 99"));
}

#[test]
fn missing_order_form_is_an_error() {
    let (tmp, _form, source, _target) = setup();
    let result = parse_and_rename_orders(tmp.path().join("no_such.csv"), &source);
    assert!(result.is_err());
}
