use skyglance_core::{Theme, ViewState, WeatherSnapshot};

const WIDTH: usize = 32;

fn rule(theme: Theme) -> String {
    let ch = match theme {
        Theme::Dark => '━',
        Theme::Light => '─',
    };
    std::iter::repeat_n(ch, WIDTH).collect()
}

/// Human-readable view of the whole widget.
pub fn render(state: &ViewState) -> String {
    let mut out = String::new();

    if state.is_loading() {
        out.push_str(" Loading weather…\n");
    }

    if let Some(message) = state.error_message() {
        out.push_str(&format!(" ! {message}\n"));
    }

    if let Some(snapshot) = state.snapshot().filter(|_| !state.is_loading()) {
        let rule = rule(state.theme());
        out.push_str(&format!("{rule}\n{}{rule}\n", card(state, snapshot)));
    }

    if !state.recent().is_empty() {
        let chips: Vec<String> = state
            .recent()
            .iter()
            .enumerate()
            .map(|(i, city)| format!("[{}] {city}", i + 1))
            .collect();
        out.push_str(&format!(" Recent: {}\n", chips.join("  ")));
    }

    out
}

fn card(state: &ViewState, snapshot: &WeatherSnapshot) -> String {
    let unit = state.unit();
    let suffix = unit.suffix();

    format!(
        " {city}\n \
         {temp}{suffix}  {description}\n \
         {:<11}{humidity}%\n \
         {:<11}{wind} mph\n \
         {:<11}{pressure} hPa\n \
         {:<11}{feels}{suffix}\n",
        "Humidity",
        "Wind",
        "Pressure",
        "Feels like",
        city = snapshot.city,
        temp = unit.convert(snapshot.temperature_c),
        description = snapshot.description,
        humidity = snapshot.humidity_pct,
        wind = snapshot.wind_speed_mph,
        pressure = snapshot.pressure_hpa,
        feels = unit.convert(snapshot.feels_like_c),
    )
}
