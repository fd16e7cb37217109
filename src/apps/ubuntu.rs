//! Base Ubuntu host preparation: packages, time sync, resolver.

use crate::component::CatalogueApp;
use crate::target::TargetDescriptor;
use crate::template::{CustomAction, TemplateTable, write_file};

const NTP_DROP_IN: &str = "/etc/systemd/timesyncd.conf.d/custom.conf";
const NTP_SERVERS: &str = "10.16.70.11 10.16.70.12 10.16.70.13 10.16.70.14";

fn ntp_file(_: &TargetDescriptor) -> String {
    write_file(NTP_DROP_IN, &format!("[Time]\nNTP={}\n", NTP_SERVERS))
}

pub const UBUNTU: CatalogueApp = CatalogueApp {
    name: "ubuntu",
    description: "Ubuntu base configuration",
    install: &[
        "apt update -y",
        "apt upgrade -y",
        "apt install sqlite3 -y",
        "mkdir -p /etc/systemd/timesyncd.conf.d",
        "CUSTOM: CreateNTPFile",
        "timedatectl set-timezone Europe/Copenhagen",
        "systemctl restart systemd-timesyncd",
        "timedatectl status",
        "timedatectl show-timesync --all",
        "systemctl mask --now fwupd.service",
        "systemctl mask --now fwupd-refresh.service",
        "systemctl mask --now fwupd-refresh.timer",
        "rm -f /etc/resolv.conf",
        "ln -s /run/systemd/resolve/resolv.conf /etc/resolv.conf",
    ],
    update: &["apt update -y", "apt upgrade -y", "apt install sqlite3 -y"],
    secondary_on_install: false,
    templates: TemplateTable::new(&[(CustomAction::CreateNtpFile, ntp_file)]),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::plan::Step;

    #[test]
    fn test_ntp_drop_in() {
        let cmd = UBUNTU.resolve(&Step::custom("CreateNTPFile"), &TargetDescriptor::new("h", "u", "p"));
        assert_eq!(
            cmd,
            "sudo bash -c 'cat > /etc/systemd/timesyncd.conf.d/custom.conf <<EOF\n\
             [Time]\n\
             NTP=10.16.70.11 10.16.70.12 10.16.70.13 10.16.70.14\n\
             EOF'"
        );
    }
}
