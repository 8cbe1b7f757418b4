use crate::models::RawApartment;
use serde_json::{json, Value};
use tracing::info;

/// Sample listings in the backend's record format
pub fn sample_listings() -> Vec<RawApartment> {
    info!("📋 Generating sample listings");

    let records = json!([
        {
            "ApartmentID": 1,
            "Creator_ID": 101,
            "Creator_FullName": "Noa Levi",
            "Creator_ProfilePicture": "https://example.com/avatars/101.jpg",
            "ApartmentType": 0,
            "Location": location("Dizengoff 120, Tel Aviv-Yafo, Israel", 32.0809, 34.7740),
            "Description": "Bright two-room flat a minute from Dizengoff Square.",
            "Price": 6900,
            "AmountOfRooms": 2,
            "AllowPet": true,
            "AllowSmoking": false,
            "ParkingSpace": 0,
            "EntryDate": "2024-09-01",
            "ExitDate": null,
            "Rental_ContractLength": 12,
            "Rental_ExtensionPossible": true,
            "LabelsJson": "[\"balcony\",\"elevator\",\"ac\"]",
            "NumOfLikes": 24,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 2,
            "Creator_ID": 102,
            "Creator_FullName": "Omer Katz",
            "ApartmentType": 1,
            "Location": location("Florentin 5, Tel Aviv-Yafo, Israel", 32.0566, 34.7697),
            "Description": "Room in a lively shared flat, two roommates.",
            "Price": 3200,
            "AmountOfRooms": 4,
            "AllowPet": false,
            "AllowSmoking": true,
            "ParkingSpace": 0,
            "EntryDate": "2024-08-15",
            "Shared_NumberOfRoommates": 2,
            "Roommates": "name:Maya,gender:female,age:26|name:Itay,gender:male,age:29",
            "LabelsJson": "[\"balcony\",\"furnished\"]",
            "NumOfLikes": 31,
            "IsLikedByUser": true
        },
        {
            "ApartmentID": 3,
            "Creator_ID": 103,
            "Creator_FullName": "Yael Bar",
            "ApartmentType": 2,
            "Location": location("Ibn Gabirol 30, Tel Aviv-Yafo, Israel", 32.0790, 34.7818),
            "Description": "Whole-flat sublet for the winter, fully furnished.",
            "Price": 7500,
            "AmountOfRooms": 3,
            "AllowPet": false,
            "AllowSmoking": false,
            "ParkingSpace": 1,
            "EntryDate": "2024-11-01",
            "ExitDate": "2025-02-28",
            "Sublet_CanCancelWithoutPenalty": true,
            "Sublet_IsWholeProperty": true,
            "LabelsJson": "[\"furnished\",\"parking\",\"elevator\"]",
            "NumOfLikes": 12,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 4,
            "Creator_ID": 104,
            "Creator_FullName": "Dana Cohen",
            "ApartmentType": 1,
            "Location": location("Herzl 12, Haifa, Israel", 32.8148, 34.9965),
            "Description": "Quiet shared apartment near the Technion shuttle.",
            "Price": 2400,
            "AmountOfRooms": 3,
            "AllowPet": true,
            "AllowSmoking": false,
            "ParkingSpace": 1,
            "EntryDate": "2024-10-01",
            "Shared_NumberOfRoommates": 1,
            "Roommates": "name:Shira,gender:female,age:23",
            "LabelsJson": "[\"garden\"]",
            "NumOfLikes": 8,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 5,
            "Creator_ID": 105,
            "Creator_FullName": "Amit Peretz",
            "ApartmentType": 0,
            "Location": "Rothschild 40, Tel Aviv-Yafo",
            "Description": "Renovated Bauhaus apartment on the boulevard.",
            "Price": "9800",
            "AmountOfRooms": "3.5",
            "AllowPet": "1",
            "AllowSmoking": "0",
            "ParkingSpace": 1,
            "EntryDate": "2024-09-15T00:00:00.000Z",
            "Rental_ContractLength": 24,
            "Rental_ExtensionPossible": false,
            "LabelsJson": "[{\"label\":\"Balcony\",\"icon\":\"balcony\"},{\"label\":\"Elevator\",\"icon\":\"elevator\"}]",
            "NumOfLikes": 24,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 6,
            "Creator_ID": 106,
            "Creator_FullName": "Lior Ben-David",
            "ApartmentType": 1,
            "Location": location("King George 70, Jerusalem, Israel", 31.7781, 35.2167),
            "Description": "Shared flat in the city centre, student friendly.",
            "Price": 2800,
            "AmountOfRooms": 5,
            "AllowPet": false,
            "AllowSmoking": false,
            "ParkingSpace": 0,
            "EntryDate": "2024-09-01",
            "Shared_NumberOfRoommates": 3,
            "Roommates": "name:Eden,gender:male|name:Ron,gender:male|name:Tal,gender:male",
            "LabelsJson": "[\"balcony\",\"ac\"]",
            "NumOfLikes": 5,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 7,
            "Creator_ID": 107,
            "Creator_FullName": "Tamar Azulay",
            "ApartmentType": 2,
            "Location": location("Ben Yehuda 150, Tel Aviv-Yafo, Israel", 32.0893, 34.7722),
            "Description": "Room sublet by the beach for the summer.",
            "Price": 4100,
            "AmountOfRooms": 2,
            "AllowPet": true,
            "AllowSmoking": true,
            "ParkingSpace": 0,
            "EntryDate": "2024-07-01",
            "ExitDate": "2024-09-30",
            "Sublet_CanCancelWithoutPenalty": false,
            "Sublet_IsWholeProperty": false,
            "LabelsJson": "[\"ac\"]",
            "NumOfLikes": 17,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 8,
            "Creator_ID": 108,
            "Creator_FullName": "Guy Friedman",
            "ApartmentType": 0,
            "Location": location("HaNassi 20, Haifa, Israel", 32.8042, 34.9864),
            "Description": "Sea view on the Carmel, quiet building.",
            "Price": 5200,
            "AmountOfRooms": 3,
            "AllowPet": false,
            "AllowSmoking": false,
            "ParkingSpace": 2,
            "EntryDate": "2024-10-15",
            "Rental_ContractLength": 12,
            "Rental_ExtensionPossible": true,
            "LabelsJson": "[\"parking\",\"balcony\"]",
            "NumOfLikes": 3,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 9,
            "Creator_ID": 109,
            "Creator_FullName": "Hila Mizrahi",
            "ApartmentType": 1,
            "Location": location("Shenkin 18, Tel Aviv-Yafo, Israel", 32.0668, 34.7740),
            "Description": "Sunny room with a big balcony on Shenkin.",
            "Price": 3900,
            "AmountOfRooms": 3,
            "AllowPet": true,
            "AllowSmoking": false,
            "ParkingSpace": 0,
            "EntryDate": "2024-09-10",
            "Shared_NumberOfRoommates": 2,
            "Roommates": "name:Noam,gender:male,age:31|name:Gal,gender:female,age:28",
            "LabelsJson": "[\"Balcony\",\"AC\",\"Furnished\"]",
            "NumOfLikes": 19,
            "IsLikedByUser": false
        },
        {
            "ApartmentID": 10,
            "Creator_ID": 110,
            "Creator_FullName": "Eyal Shapiro",
            "ApartmentType": 0,
            "Location": location("Emek Refaim 22, Jerusalem, Israel", 31.7634, 35.2193),
            "Description": "Family apartment in the German Colony.",
            "Price": 8200,
            "AmountOfRooms": 4,
            "AllowPet": true,
            "AllowSmoking": false,
            "ParkingSpace": 1,
            "EntryDate": "2024-12-01",
            "Rental_ContractLength": 12,
            "Rental_ExtensionPossible": true,
            "LabelsJson": "[\"garden\",\"parking\",\"storage\"]",
            "NumOfLikes": 11,
            "IsLikedByUser": false
        }
    ]);

    parse_records(records)
}

fn location(address: &str, latitude: f64, longitude: f64) -> String {
    json!({
        "address": address,
        "latitude": latitude,
        "longitude": longitude,
        "types": ["street_address"]
    })
    .to_string()
}

fn parse_records(records: Value) -> Vec<RawApartment> {
    let Value::Array(items) = records else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApartmentKind, ApartmentPatch};

    #[test]
    fn every_fixture_decodes() {
        let listings = sample_listings();
        assert_eq!(listings.len(), 10);

        let apartments: Vec<_> = listings
            .into_iter()
            .map(|raw| ApartmentPatch::from(raw).into_apartment())
            .collect();

        let legacy = &apartments[4];
        assert_eq!(legacy.location.address, "Rothschild 40, Tel Aviv-Yafo");
        assert_eq!(legacy.price, 9800);
        assert!(legacy.labels.contains("balcony"));

        assert!(apartments
            .iter()
            .filter(|a| matches!(a.kind, ApartmentKind::Shared { .. }))
            .all(|a| !a.roommates().is_empty()));
    }
}
