use leptos::prelude::*;

use crate::session;
use crate::state::AppState;

#[component]
pub fn MarkerTable() -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        <div class="sidebar-panel">
            <div class="setting-group-title">"Markers"</div>
            <table class="marker-table">
                <thead>
                    <tr>
                        <th>"#"</th>
                        <th>"MHz"</th>
                        <th>"dB"</th>
                        <th>"Time (s)"</th>
                        <th>"\u{0394} MHz"</th>
                        <th></th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        state
                            .marker_rows
                            .get()
                            .into_iter()
                            .map(|row| {
                                let index = row.index;
                                view! {
                                    <tr class=if row.visible { "" } else { "marker-hidden" }>
                                        <td>{row.index}</td>
                                        <td>{row.frequency}</td>
                                        <td>{row.power}</td>
                                        <td>{row.time}</td>
                                        <td>{row.delta}</td>
                                        <td>
                                            <button
                                                class="marker-btn"
                                                on:click=move |_| {
                                                    session::with_view(&state, |v| v.toggle_marker_visibility(index));
                                                }
                                                title="Show/hide"
                                            >{if row.visible { "\u{25C9}" } else { "\u{25CB}" }}</button>
                                        </td>
                                        <td>
                                            <button
                                                class="marker-btn"
                                                on:click=move |_| {
                                                    session::with_view(&state, |v| v.delete_marker(index));
                                                }
                                                title="Delete"
                                            >"\u{2715}"</button>
                                        </td>
                                    </tr>
                                }
                            })
                            .collect_view()
                    }}
                </tbody>
            </table>
            {move || state.marker_rows.with(|rows| rows.is_empty()).then(|| view! {
                <div class="empty-state">"Click the display to place a marker"</div>
            })}
        </div>
    }
}
