use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use osmchangesets::{BoundingBox, ChangesetQuery, Client, ClientConfig, Error, Tag};
use serde_json::json;
use std::time::Duration;

const CROSSWALK: &str = r##"
{
  "version": "0.6",
  "generator": "CGImap 0.8.10 (154593 spike-06.openstreetmap.org)",
  "copyright": "OpenStreetMap and contributors",
  "attribution": "http://www.openstreetmap.org/copyright",
  "license": "http://opendatacommons.org/licenses/odbl/1-0/",
  "elements": [
    {
      "type": "changeset",
      "id": 147937232,
      "created_at": "2024-02-26T15:30:59Z",
      "closed_at": "2024-02-26T15:30:59Z",
      "open": false,
      "user": "mvexel",
      "uid": 8909,
      "minlat": 40.7402267,
      "minlon": -111.817534,
      "maxlat": 40.740355,
      "maxlon": -111.817531,
      "comments_count": 0,
      "changes_count": 5,
      "tags": {
        "changesets_count": "22734",
        "comment": "Adding markings detail to crosswalk #maproulette mpr.lt/c/41675/t/217416625",
        "created_by": "iD 2.27.3",
        "hashtags": "#maproulette",
        "host": "https://www.openstreetmap.org/edit",
        "imagery_used": "Esri World Imagery",
        "locale": "en-US",
        "resolved:outdated_tags:incomplete_tags": "2"
      }
    }
  ]
}
"##;

fn client_for(server: &MockServer) -> Client {
    Client::with_config(ClientConfig {
        url: server.base_url(),
        user_agent: "osmchangesets-tests".to_string(),
        timeout: Duration::from_secs(10),
        verify: true,
    })
    .unwrap()
}

fn element(id: u64) -> serde_json::Value {
    json!({"version": "0.6", "elements": [{
        "type": "changeset",
        "id": id,
        "user": format!("user{id}"),
        "uid": id,
        "changes_count": id * 10
    }]})
}

#[test]
fn get_changeset_from_api() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/0.6/changeset/147937232.json")
            .header("User-Agent", "osmchangesets-tests");
        then.status(200)
            .header("Content-Type", "application/json")
            .body(CROSSWALK);
    });

    let changeset = client_for(&server).get_changeset(147937232).unwrap();
    mock.assert();

    let ts = Utc.with_ymd_and_hms(2024, 2, 26, 15, 30, 59).unwrap();
    assert_eq!(changeset.osm_id, Some(147937232));
    assert_eq!(changeset.created_at, Some(ts));
    assert_eq!(changeset.closed_at, Some(ts));
    assert!(!changeset.is_open);
    assert_eq!(changeset.user.as_deref(), Some("mvexel"));
    assert_eq!(changeset.uid, Some(8909));
    assert_eq!(changeset.comments_count, 0);
    assert_eq!(changeset.changes_count, 5);
    assert_eq!(changeset.tags.len(), 8);
    assert_eq!(changeset.tags[2], Tag::new("created_by", "iD 2.27.3"));
    assert!(changeset.bounds.area() > 0.0);
    assert_eq!(
        changeset.bounds.wkt().as_deref(),
        Some(
            "POLYGON((-111.817534 40.7402267,-111.817531 40.7402267,-111.817531 40.740355,-111.817534 40.740355,-111.817534 40.7402267))"
        )
    );
}

#[test]
fn get_changeset_without_bounds_from_api() {
    let server = MockServer::start();
    let mut doc: serde_json::Value = serde_json::from_str(CROSSWALK).unwrap();
    let entry = doc["elements"][0].as_object_mut().unwrap();
    for key in ["minlat", "minlon", "maxlat", "maxlon"] {
        entry.remove(key);
    }
    server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/147937232.json");
        then.status(200).json_body(doc);
    });

    let changeset = client_for(&server).get_changeset(147937232).unwrap();
    assert_eq!(changeset.bounds.area(), 0.0);
    assert!(changeset.bounds.wkt().is_none());
    assert_eq!(changeset.changes_count, 5);
    assert_eq!(changeset.tags.len(), 8);
}

#[test]
fn missing_changeset_is_an_http_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/0.json");
        then.status(404)
            .header("Error", "Changeset 0 was not found")
            .body("Changeset 0 was not found");
    });

    let err = client_for(&server).get_changeset(0).unwrap_err();
    assert!(err.is_http());
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert!(err.to_string().contains("Changeset 0 was not found"));
}

#[test]
fn empty_elements_is_invalid_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/5.json");
        then.status(200).json_body(json!({"version": "0.6", "elements": []}));
    });

    let err = client_for(&server).get_changeset(5).unwrap_err();
    assert!(matches!(err, Error::InvalidChangesetJson { .. }), "{err}");
}

#[test]
fn get_changesets_keeps_input_order() {
    let server = MockServer::start();
    let mocks: Vec<_> = [3u64, 1, 2]
        .into_iter()
        .map(|id| {
            server.mock(|when, then| {
                when.method(GET).path(format!("/api/0.6/changeset/{id}.json"));
                then.status(200).json_body(element(id));
            })
        })
        .collect();

    let changesets = client_for(&server).get_changesets(&[3, 1, 2]).unwrap();
    let ids: Vec<_> = changesets.iter().map(|c| c.osm_id).collect();
    assert_eq!(ids, [Some(3), Some(1), Some(2)]);
    assert_eq!(changesets[0].changes_count, 30);
    for mock in mocks {
        mock.assert_hits(1);
    }
}

#[test]
fn get_changesets_aborts_on_first_failure() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/1.json");
        then.status(200).json_body(element(1));
    });
    let failing = server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/2.json");
        then.status(410).body("Gone");
    });
    let never = server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/3.json");
        then.status(200).json_body(element(3));
    });

    let err = client_for(&server)
        .get_changesets(&[1, 2, 3])
        .unwrap_err();
    match &err {
        Error::Changeset { id, source } => {
            assert_eq!(*id, 2);
            assert_eq!(source.status(), Some(reqwest::StatusCode::GONE));
        }
        other => panic!("unexpected error: {other}"),
    }
    first.assert_hits(1);
    failing.assert_hits(1);
    never.assert_hits(0);
}

#[test]
fn get_changesets_aborts_on_parse_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changeset/1.json");
        then.status(200).body("{ not json");
    });

    let err = client_for(&server).get_changesets(&[1]).unwrap_err();
    match err {
        Error::Changeset { id: 1, source } => {
            assert!(matches!(*source, Error::InvalidChangesetJson { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn latest_changesets_sends_limit() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/0.6/changesets.json")
            .query_param("limit", "2");
        then.status(200).json_body(json!({"version": "0.6", "changesets": [
            {"id": 11, "user": "a", "open": true,
             "min_lat": 1.0, "min_lon": 1.0, "max_lat": 1.5, "max_lon": 1.5},
            {"id": 10, "user": "b", "closed_at": "2024-02-26T15:30:59Z"}
        ]}));
    });

    let latest = client_for(&server).latest_changesets(2).unwrap();
    mock.assert();
    assert_eq!(latest.len(), 2);
    assert!(latest[0].is_open);
    assert!(latest[0].bounds.area() > 0.0);
    assert_eq!(latest[1].bounds.area(), 0.0);
    assert!(latest[1].closed_at.is_some());
}

#[test]
fn query_changesets_sends_filters() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/0.6/changesets.json")
            .query_param("display_name", "mvexel")
            .query_param("bbox", "3.2,50.8,7.2,53.6")
            .query_param("closed", "true");
        then.status(200)
            .json_body(json!({"changesets": [{"id": 2, "user": "mvexel"}, {"id": 1, "user": "mvexel"}]}));
    });

    let query = ChangesetQuery::new()
        .display_name("mvexel")
        .bbox(BoundingBox::new(3.2, 50.8, 7.2, 53.6).unwrap());
    let found = client_for(&server).query_changesets(&query).unwrap();
    mock.assert();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|c| c.user.as_deref() == Some("mvexel")));
}

#[test]
fn invalid_inputs_never_reach_the_network() {
    let server = MockServer::start();
    let any = server.mock(|when, then| {
        when.any_request();
        then.status(200).json_body(json!({"changesets": []}));
    });

    assert!(matches!(
        BoundingBox::new(7.2, 50.8, 3.2, 53.6),
        Err(Error::InvalidBbox(_))
    ));
    assert!(matches!(
        client_for(&server).latest_changesets(0),
        Err(Error::InvalidArgument(_))
    ));
    any.assert_hits(0);
}

#[test]
fn list_without_changesets_key_is_invalid() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/0.6/changesets.json");
        then.status(200).json_body(json!({"version": "0.6"}));
    });

    let err = client_for(&server)
        .query_changesets(&ChangesetQuery::new())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidChangesetJson { .. }));
}
