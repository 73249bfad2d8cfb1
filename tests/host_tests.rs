use gpui_timescroll::host::{
    HostParams, HostState, FETCH_ERROR_MESSAGE, NOT_EMBEDDED_MESSAGE, NO_DATA_MESSAGE,
    WAITING_MESSAGE,
};
use gpui_timescroll::views::{LoadedView, ViewData};
use serde_json::json;

fn waiting() -> HostState {
    HostState::from_params(&HostParams::from_query("?figureId=fig1"))
}

#[test]
fn test_startup_states() {
    let state = HostState::from_params(&HostParams::from_query(""));
    assert_eq!(state, HostState::NotEmbedded);
    assert_eq!(state.message().as_deref(), Some(NOT_EMBEDDED_MESSAGE));

    let state = HostState::from_params(&HostParams::from_query("figureId=fig1&test=1"));
    assert_eq!(state, HostState::TestMode);
    assert_eq!(state.message(), None);

    assert_eq!(waiting(), HostState::WaitingForData);
    assert_eq!(waiting().message().as_deref(), Some(WAITING_MESSAGE));
}

#[test]
fn test_empty_figure_id_is_not_embedded() {
    let params = HostParams::from_query("figureId=&test=0");
    assert_eq!(params.figure_id, None);
    assert!(!params.test);
    assert_eq!(HostState::from_params(&params), HostState::NotEmbedded);
}

#[test]
fn test_received_data_is_loaded() {
    let state = waiting().receive(Ok(Some(json!({"type": "Empty"}))));
    assert_eq!(state, HostState::Ready(LoadedView::View(ViewData::Empty)));
    assert_eq!(state.message(), None);

    let state = waiting().receive(Ok(Some(json!({"type": "nope"}))));
    assert_eq!(state.message().as_deref(), Some("Invalid view data: nope"));
}

#[test]
fn test_missing_or_failed_data() {
    let state = waiting().receive(Ok(None));
    assert_eq!(state, HostState::Error(NO_DATA_MESSAGE.to_string()));
    assert_eq!(state.message().as_deref(), Some(NO_DATA_MESSAGE));

    let state = waiting().receive(Err(eyre::eyre!("connection reset")));
    assert_eq!(state.message().as_deref(), Some(FETCH_ERROR_MESSAGE));
}

#[test]
fn test_only_waiting_state_accepts_data() {
    let state = HostState::NotEmbedded.receive(Ok(Some(json!({"type": "Empty"}))));
    assert_eq!(state, HostState::NotEmbedded);

    let ready = waiting().receive(Ok(Some(json!({"type": "Empty"}))));
    let again = ready.clone().receive(Ok(None));
    assert_eq!(again, ready);
}
