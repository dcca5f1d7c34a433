mod common;

use common::{car_model, classes, store};
use composedb::{ActsAsOptions, HostModel, Result, SerializeOptions};
use serde_json::json;

#[test]
fn test_as_json_includes_delegated_fields() -> Result<()> {
    let mut store = store();
    let classes = classes();
    let cars = car_model(&store, &classes)?;

    let mut car = cars.new_record();
    car.write(&mut store, "make", "Toyota")?;
    car.write(&mut store, "color", "red")?;
    car.save(&mut store)?;

    let json = car.as_json(&mut store, &SerializeOptions::new().except(["created_at", "updated_at"]))?;
    assert_eq!(
        json,
        json!({
            "id": 1,
            "make": "Toyota",
            "status": null,
            "paint_id": 1,
            "trim_id": null,
            "sticker_id": null,
            "color": "red",
            "finish": null,
            "name": null,
        })
    );
    Ok(())
}

#[test]
fn test_as_json_keeps_caller_methods() -> Result<()> {
    let mut store = store();
    let classes = classes();
    let cars = HostModel::define(&store, &classes, "car")?
        .acts_as("paint", ActsAsOptions::new().prefix(["name"]))?
        .build();

    let mut car = cars.new_record();
    car.write(&mut store, "color", "red")?;
    car.write(&mut store, "paint_name", "Crimson")?;

    let options = SerializeOptions::new().only(["make"]).methods(["make_changed"]);
    let json = car.as_json(&mut store, &options)?;
    assert_eq!(
        json,
        json!({
            "make": null,
            "make_changed": false,
            "color": "red",
            "finish": null,
            "paint_name": "Crimson",
        })
    );
    assert_eq!(options.methods, vec!["make_changed".to_string()]);
    Ok(())
}

#[test]
fn test_as_json_with_virtual_attribute() -> Result<()> {
    let mut store = store();
    let classes = classes();
    let cars = HostModel::define(&store, &classes, "car")?
        .acts_as("paint", ActsAsOptions::new().with(["shade"]))?
        .build();

    let mut car = cars.new_record();
    car.write(&mut store, "color", "red")?;

    let json = car.as_json(&mut store, &SerializeOptions::new().only(Vec::<String>::new()))?;
    assert_eq!(json["shade"], json!("dark red"));
    assert_eq!(json.as_object().map(|o| o.len()), Some(4));
    Ok(())
}
