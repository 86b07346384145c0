// Dashboard page: now-playing panel, audio element and the track listing
use crate::db::models::Track;
use crate::player::controller::{
    track_row_id, ATTR_ALBUM, ATTR_ARTIST, ATTR_MIME, ATTR_TITLE, AUDIO_ID, AUDIO_SOURCE_ID,
    CURRENT_ALBUM_ID, CURRENT_ALBUM_PIC_ID, CURRENT_ARTIST_ID, CURRENT_TRACK_ID,
};
use crate::player::document::{Element, Page};

use super::assets::{DASHBOARD_JS_PATH, NOCOVER_PATH};

const PAGE_TITLE: &str = "trackdeck";

/// Quote `value` as a JavaScript string literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Click handler starting playback and refreshing the panel for `track`
fn row_handler(track: &Track) -> String {
    format!(
        "play({id}, {mime}); showNowPlaying({id}, {title}, {artist}, {album})",
        id = track.id,
        mime = js_string(&track.mime),
        title = js_string(track.display_title()),
        artist = js_string(track.artist.as_deref().unwrap_or_default()),
        album = js_string(track.album.as_deref().unwrap_or_default()),
    )
}

/// Build the dashboard for `tracks`, in the order given
pub fn build_dashboard(tracks: &[Track]) -> Page {
    let mut page = Page::new(PAGE_TITLE);
    let head = page.head();
    let body = page.body();

    page.append(head, Element::new("script").with_attr("src", DASHBOARD_JS_PATH));

    let panel = page.append(body, Element::new("div").with_attr("id", "now-playing"));
    page.append(
        panel,
        Element::new("img")
            .with_attr("id", CURRENT_ALBUM_PIC_ID)
            .with_attr("src", NOCOVER_PATH)
            .with_attr("alt", "Album cover"),
    );
    let info = page.append(panel, Element::new("div").with_attr("class", "now-playing-info"));
    page.append(info, Element::new("span").with_attr("id", CURRENT_TRACK_ID));
    page.append(info, Element::new("span").with_attr("id", CURRENT_ARTIST_ID));
    page.append(info, Element::new("span").with_attr("id", CURRENT_ALBUM_ID));

    let audio = page.append(
        panel,
        Element::new("audio")
            .with_attr("id", AUDIO_ID)
            .with_attr("controls", "")
            .with_attr("preload", "none"),
    );
    page.append(audio, Element::new("source").with_attr("id", AUDIO_SOURCE_ID));

    let table = page.append(body, Element::new("table").with_attr("id", "tracks"));
    let thead = page.append(table, Element::new("thead"));
    let header = page.append(thead, Element::new("tr"));
    for label in ["Title", "Artist", "Album"] {
        page.append(header, Element::new("th").with_text(label));
    }

    let tbody = page.append(table, Element::new("tbody"));
    for track in tracks {
        let row = page.append(
            tbody,
            Element::new("tr")
                .with_attr("id", track_row_id(track.id))
                .with_attr("class", "track")
                .with_attr(ATTR_TITLE, track.display_title())
                .with_attr(ATTR_ARTIST, track.artist.as_deref().unwrap_or_default())
                .with_attr(ATTR_ALBUM, track.album.as_deref().unwrap_or_default())
                .with_attr(ATTR_MIME, track.mime.as_str())
                .with_attr("onclick", row_handler(track)),
        );
        page.append(row, Element::new("td").with_text(track.display_title()));
        page.append(row, Element::new("td").with_text(track.artist.as_deref().unwrap_or_default()));
        page.append(row, Element::new("td").with_text(track.album.as_deref().unwrap_or_default()));
    }

    page
}
